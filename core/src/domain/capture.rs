//! Capture command construction.

/// Packet capture binary expected inside the debug image.
pub const CAPTURE_TOOL: &str = "tcpdump";

/// Builds the capture command line.
///
/// Packets are written unbuffered (`-U`) as pcap to stdout (`-w -`). The
/// filter expression is appended as a single trailing argument, and left
/// out entirely when empty.
pub fn capture_command(interface: &str, filter: &str) -> Vec<String> {
    let mut command: Vec<String> = [CAPTURE_TOOL, "-i", interface, "-U", "-w", "-"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    if !filter.is_empty() {
        command.push(filter.to_string());
    }

    command
}
