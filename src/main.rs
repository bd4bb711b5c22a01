/*
 *  main.rs
 *
 *  xclock - time bends, digits glitch
 *	(c) 2024-26 xclock contributors
 *
 *	xclock entry point
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use anyhow::Context;
use env_logger::Env;
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use xclock::config;
use xclock::control;
use xclock::display::ConsolePainter;
use xclock::engine::{Engine, SystemTimeSource};
use xclock::netinfo::{show_ip_switch, LocalAddress};
use xclock::runtime::spawn_engine;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Waits for SIGINT, SIGTERM or SIGHUP and logs which one arrived.
#[cfg(unix)]
async fn signal_handler() -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

#[cfg(not(unix))]
async fn signal_handler() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received. Initiating graceful shutdown.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load().context("loading configuration")?;

    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.log_level()))
        .format_timestamp_secs()
        .init();

    info!(
        "{} v.{} built {} ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        BUILD_DATE,
        BUILD_PROFILE
    );

    let settings = cfg.to_engine_settings();
    info!(
        "frame every {}s, brightness {}%, fading in over {}s",
        settings.framerate, settings.brightness, settings.startup_fade_secs
    );

    let engine = Engine::new(
        settings,
        Box::new(SystemTimeSource),
        Box::new(LocalAddress),
        StdRng::from_os_rng(),
    );
    let (handle, engine_task) = spawn_engine(engine, Box::new(ConsolePainter::new()));

    let show_ip = cfg.show_ip() || (cfg.use_gpio() && show_ip_switch(cfg.gpio_pin()));
    if show_ip {
        if let Err(e) = handle.command("showip", vec![json!(1)]).await {
            warn!("could not show IP address: {}", e);
        }
    }

    let socket = control::bind(cfg.bind(), cfg.port())
        .await
        .context("starting control listener")?;

    tokio::select! {
        res = control::serve(socket, handle.clone()) => {
            if let Err(e) = res {
                error!("control listener stopped: {}", e);
            }
        }
        res = signal_handler() => {
            if let Err(e) = res {
                error!("signal handling failed: {}", e);
            }
        }
    }

    handle.shutdown().await;
    engine_task.await.context("engine task")?;
    info!("bye");
    Ok(())
}
