//! `chatrelay serve`

use crate::args::ServeArgs;
use crate::console::CliConsole;
use chatrelay_core::RelayConfig;
use chatrelay_server::RelayServer;

/// Apply command-line overrides and run the server until shutdown
pub async fn execute(mut config: RelayConfig, args: ServeArgs) -> anyhow::Result<()> {
    apply_overrides(&mut config, &args);
    config.validate()?;

    let console = CliConsole::new(true);
    console.print_header("chatrelay");
    console.info(&format!("Listening on http://{}", config.listen_address()));
    console.info(&format!("Upstream: {}", config.upstream.api_url));
    if !config.server.require_session {
        console.warn("Sessions are not required; anonymous callers share one conversation");
    }

    RelayServer::new(&config)?.run().await?;
    Ok(())
}

fn apply_overrides(config: &mut RelayConfig, args: &ServeArgs) {
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.no_session {
        config.server.require_session = false;
    }
}
