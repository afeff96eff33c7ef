use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use hashtalk::client::{self, ClientConfig, ClientEvent, ClientHandle, RejoinPolicy, Status};
use hashtalk::server::{self, RequeuePolicy, ServerConfig, parse_ice_servers};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hashtalk")]
#[command(about = "Random 1:1 video chat: matchmaking relay and headless participant")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the matchmaking and signaling relay.
    Serve {
        /// Overrides HASHTALK_BIND.
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// What happens to a participant whose partner leaves. Overrides HASHTALK_REQUEUE.
        #[arg(long)]
        requeue: Option<RequeuePolicy>,

        /// ICE server url advertised to clients, repeatable. Overrides HASHTALK_ICE_SERVERS.
        #[arg(long = "ice")]
        ice: Vec<String>,
    },

    /// Join the pool as a headless participant that receives audio and video.
    Join {
        #[arg(long, default_value = "ws://127.0.0.1:3000/ws")]
        url: String,

        /// Negotiation timeout in seconds.
        #[arg(long, default_value_t = 30)]
        timeout: u64,

        #[arg(long, default_value_t = RejoinPolicy::Automatic)]
        rejoin: RejoinPolicy,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match Cli::parse().command {
        Commands::Serve { bind, requeue, ice } => {
            let mut config = ServerConfig::from_env();
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(requeue) = requeue {
                config.requeue = requeue;
            }
            if !ice.is_empty() {
                config.ice_servers = parse_ice_servers(&ice.join(","));
            }

            println!("{}", "📡 Starting hashtalk relay...".green().bold());
            println!("   Bind:    {}", config.bind);
            println!("   Requeue: {}", config.requeue);
            server::serve(config).await
        }

        Commands::Join {
            url,
            timeout,
            rejoin,
        } => {
            let config = ClientConfig {
                url,
                negotiation_timeout: Duration::from_secs(timeout),
                rejoin,
                ..ClientConfig::default()
            };

            println!("{}", format!("🔌 Connecting to {}...", config.url).cyan());
            let handle = client::connect(config)
                .await
                .context("Failed to reach the relay")?;
            run_participant(handle).await
        }
    }
}

async fn run_participant(mut handle: ClientHandle) -> Result<()> {
    let mut status = handle.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, leaving");
                handle.stop();
                break;
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                print_status(*status.borrow_and_update());
            }
            event = handle.next_event() => match event {
                Some(event) => print_event(&event),
                None => break,
            },
        }
    }

    handle.join().await.context("Relay connection lost")?;
    println!("{}", "👋 Bye".dimmed());
    Ok(())
}

fn print_status(status: Status) {
    let label = match status {
        Status::Waiting => "waiting for a partner".yellow(),
        Status::Connected => "connected".green().bold(),
        Status::Disconnected => "disconnected".red(),
    };
    println!("● {}", label);
}

fn print_event(event: &ClientEvent) {
    match event {
        ClientEvent::Matched { role, peer_id, .. } => {
            println!("   matched with {} as {}", peer_id.to_string().bold(), role);
        }
        ClientEvent::RemoteTrack { kind, .. } => {
            println!("   receiving {}", kind.cyan());
        }
        ClientEvent::PeerLeft { .. } => {
            println!("   {}", "partner left".yellow());
        }
        ClientEvent::NegotiationFailed { error, .. } => {
            println!("   {} {}", "negotiation failed:".red(), error);
        }
        ClientEvent::Welcome { .. } | ClientEvent::Connected { .. } => {}
    }
}
