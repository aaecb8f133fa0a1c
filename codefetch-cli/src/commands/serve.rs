//! Serve command - run the HTTP endpoint.

use anyhow::Result;
use clap::Args;
use codefetch_fetch::Retriever;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::Cli;
use crate::server;

/// Arguments for the serve command.
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub bind: IpAddr,

    /// Port to listen on.
    #[arg(long, short, default_value_t = 3000)]
    pub port: u16,
}

/// Runs the serve command until Ctrl-C.
pub async fn run(args: &ServeArgs, cli: &Cli) -> Result<()> {
    let retriever = Retriever::new(cli.settings()?)?;
    server::serve(SocketAddr::new(args.bind, args.port), retriever).await
}
