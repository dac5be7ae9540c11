//! Capture command - stream pod traffic to stdout.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Args;
use ksniff_core::{
    EphemeralContainerSniffer, Kubectl, KubectlGateway, SettingsStore, Sniffer, SnifferSettings,
};
use tracing::{info, warn};

#[derive(Args)]
pub struct CaptureArgs {
    /// Pod to capture traffic of
    pub pod: String,

    /// Namespace of the pod
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Container whose network to capture
    #[arg(short, long)]
    pub container: String,

    /// Network interface to capture on
    #[arg(short, long)]
    pub interface: Option<String>,

    /// tcpdump filter expression
    #[arg(short, long, default_value = "")]
    pub filter: String,

    /// Debug image providing tcpdump
    #[arg(long, env = "KSNIFF_IMAGE")]
    pub image: Option<String>,

    /// Seconds to wait for the debug container to start
    #[arg(long = "timeout")]
    pub timeout_secs: Option<u64>,

    /// kubeconfig context to use
    #[arg(long)]
    pub context: Option<String>,

    /// Path to the kubeconfig file
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,
}

impl CaptureArgs {
    /// Flags win over stored defaults, which win over built-in defaults.
    async fn into_settings(self) -> Result<SnifferSettings> {
        let mut settings = SnifferSettings::new(self.pod, self.container);
        let defaults = SettingsStore::new()?.load().await?;
        defaults.apply(&mut settings);

        if let Some(namespace) = self.namespace {
            settings.namespace = namespace;
        }
        if let Some(interface) = self.interface {
            settings.interface = interface;
        }
        if self.image.is_some() {
            settings.image = self.image;
        }
        if let Some(secs) = self.timeout_secs {
            settings.container_timeout = Duration::from_secs(secs);
        }
        settings.filter = self.filter;
        settings.kube_context = self.context;
        settings.kubeconfig = self.kubeconfig;

        settings.validate()?;
        Ok(settings)
    }
}

pub async fn run(args: CaptureArgs) -> Result<()> {
    let settings = args.into_settings().await?;

    if atty::is(atty::Stream::Stdout) {
        bail!("refusing to write pcap data to a terminal; redirect stdout to a file or pipe it into wireshark -k -i -");
    }

    let kubectl = Kubectl::discover()?
        .with_context(settings.kube_context.clone())
        .with_kubeconfig(settings.kubeconfig.clone());
    let gateway = KubectlGateway::from_kubectl(kubectl, settings.namespace.clone());
    let sniffer = EphemeralContainerSniffer::new(&settings, gateway);

    info!(session = %sniffer.target().id(), "starting capture session");
    sniffer.setup().await?;

    let mut stdout = tokio::io::stdout();
    let outcome = tokio::select! {
        result = sniffer.start(&mut stdout) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted, closing capture stream");
            Ok(())
        }
    };

    sniffer.cleanup().await?;
    outcome?;
    Ok(())
}
