//! # Main Entry Point
//!
//! Initializes the application:
//! - Domain: Configuration and Types
//! - Infrastructure: Logging, Matrix
//! - Application: Repository, Session Engine, Trigger Listener, Router
//! - Interface: Command Handlers
//!

#![recursion_limit = "256"]

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use matrix_sdk::{
    Client,
    config::SyncSettings,
    room::Room,
    ruma::MilliSecondsSinceUnixEpoch,
    ruma::events::reaction::OriginalSyncReactionEvent,
    ruma::events::room::{
        member::{MembershipState, StrippedRoomMemberEvent},
        message::{MessageType, SyncRoomMessageEvent},
    },
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::application::registry::SessionRegistry;
use crate::application::repository::SurveyRepository;
use crate::application::router::CommandRouter;
use crate::application::session::SessionEngine;
use crate::application::triggers::TriggerListener;
use crate::domain::config::ConfigStore;
use crate::domain::traits::ChatPlatform;
use crate::domain::types::{ReactionAdded, UserRef};
use crate::infrastructure::matrix::{MatrixPlatform, to_answer};
use crate::strings::logs;

/// Matrix bot collecting survey answers over direct messages.
#[derive(Parser, Debug)]
#[command(name = "surveybot", version, about)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "data/config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Logging Setup
    let _log_guard = infrastructure::logging::init(Path::new(infrastructure::logging::LOG_DIR))?;
    tracing::info!("{}", logs::STARTING);

    // 2. Load Configuration
    let config_store = Arc::new(ConfigStore::load(&args.config)?);
    let config = config_store.current();

    // 3. Matrix Login
    let client = Client::builder()
        .homeserver_url(&config.services.matrix.homeserver)
        .build()
        .await
        .context("Failed to build Matrix client")?;

    client
        .matrix_auth()
        .login_username(
            &config.services.matrix.username,
            &config.services.matrix.password,
        )
        .initial_device_display_name("SurveyBot")
        .send()
        .await
        .context("Matrix login failed")?;

    if let Some(name) = &config.services.matrix.display_name {
        tracing::info!("{}", logs::setting_display_name(name));
        if let Err(e) = client.account().set_display_name(Some(name.as_str())).await {
            tracing::warn!("{}", logs::set_display_name_fail(&e.to_string()));
        }
    }

    let initial_sync = client
        .sync_once(SyncSettings::default())
        .await
        .context("Initial sync failed")?;
    let bot_user_id = client
        .user_id()
        .map(|u| u.to_string())
        .context("Client has no user id after login")?;
    tracing::info!(
        "{}",
        logs::logged_in(&bot_user_id, client.joined_rooms().len())
    );

    // 4. Application Components
    let platform: Arc<dyn ChatPlatform> =
        Arc::new(MatrixPlatform::new(client.clone(), config_store.clone()));
    let repository = Arc::new(SurveyRepository::new(&config.survey.data_dir));
    let engine = SessionEngine::new(
        platform.clone(),
        repository.clone(),
        config_store.clone(),
        Arc::new(SessionRegistry::new()),
    );
    let listener = TriggerListener::new(
        bot_user_id,
        config_store.clone(),
        repository.clone(),
        platform.clone(),
        engine.clone(),
    );
    let router = CommandRouter::new(
        config_store.clone(),
        repository.clone(),
        platform.clone(),
        engine.clone(),
    );

    // 5. Server Ready: load every server scope we are part of
    let servers: BTreeSet<String> = client
        .joined_rooms()
        .iter()
        .map(|room| config.server_for_room(room.room_id().as_str()))
        .collect();
    for server in &servers {
        if let Ok(set) = repository.load(server).await {
            tracing::info!("{}", logs::server_ready(server, set.len()));
        }
        repository.refresh_triggers(server, platform.as_ref()).await;
    }

    // 6. Event Handlers
    let start_time = SystemTime::now();

    let msg_engine = engine.clone();
    let msg_router = router.clone();
    let msg_config = config_store.clone();
    client.add_event_handler(move |ev: SyncRoomMessageEvent, room: Room| {
        let engine = msg_engine.clone();
        let router = msg_router.clone();
        let config_store = msg_config.clone();

        async move {
            let Some(original) = ev.as_original() else {
                return;
            };
            if is_before(ev.origin_server_ts(), start_time) || original.sender == room.own_user_id() {
                return;
            }
            let Some(answer) = to_answer(&original.content.msgtype) else {
                return;
            };

            let sender = original.sender.as_str();
            let room_id = room.room_id().as_str();
            if engine.offer_answer(sender, room_id, answer) {
                return;
            }

            if let MessageType::Text(text) = &original.content.msgtype {
                let server_id = config_store.current().server_for_room(room_id);
                let user = UserRef::new(sender, original.sender.localpart());
                if let Err(e) = router.route(&server_id, room_id, &user, &text.body).await {
                    tracing::error!("{}", logs::command_failed(&format!("{e:#}")));
                }
            }
        }
    });

    let reaction_config = config_store.clone();
    client.add_event_handler(move |ev: OriginalSyncReactionEvent, room: Room| {
        let listener = listener.clone();
        let config_store = reaction_config.clone();

        async move {
            if is_before(ev.origin_server_ts, start_time) {
                return;
            }
            let name = match room.get_member(&ev.sender).await {
                Ok(Some(member)) => member.name().to_string(),
                _ => ev.sender.localpart().to_string(),
            };
            let room_id = room.room_id().as_str();
            let reaction = ReactionAdded {
                server_id: config_store.current().server_for_room(room_id),
                channel_id: room_id.to_string(),
                message_id: ev.content.relates_to.event_id.to_string(),
                reaction_id: ev.event_id.to_string(),
                emoji: ev.content.relates_to.key.clone(),
                user: UserRef::new(ev.sender.as_str(), name),
            };
            listener.on_reaction(&reaction).await;
        }
    });

    // Handle Invites
    client.add_event_handler(|ev: StrippedRoomMemberEvent, room: Room| async move {
        if ev.content.membership == MembershipState::Invite {
            tracing::info!("{}", logs::invite_received(room.room_id().as_str()));
            if let Err(e) = room.join().await {
                tracing::warn!("{}", logs::join_invite_fail(&e.to_string()));
            }
        }
    });

    // 7. Sync until a termination signal arrives
    tracing::info!("{}", logs::SYNC_LOOP_START);
    let sync_client = client.clone();
    let settings = SyncSettings::default().token(initial_sync.next_batch);
    let mut sync_handle = tokio::spawn(async move { sync_client.sync(settings).await });

    let signal = tokio::select! {
        res = &mut sync_handle => {
            report_sync_end(res);
            None
        }
        res = shutdown_signal() => Some(res),
    };

    match signal {
        Some(Ok(())) => tracing::info!("{}", logs::SHUTDOWN),
        Some(Err(e)) => {
            tracing::error!("{}", logs::shutdown_fail(&e.to_string()));
            report_sync_end((&mut sync_handle).await);
        }
        None => {}
    }

    sync_handle.abort();
    tracing::info!("{}", logs::DISCONNECTED);
    Ok(())
}

fn is_before(ts: MilliSecondsSinceUnixEpoch, start_time: SystemTime) -> bool {
    UNIX_EPOCH + Duration::from_millis(ts.get().into()) < start_time
}

fn report_sync_end(res: Result<matrix_sdk::Result<()>, tokio::task::JoinError>) {
    match res {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("{}", logs::sync_loop_fail(&e.to_string())),
        Err(e) => tracing::error!("{}", logs::sync_loop_fail(&e.to_string())),
    }
}

async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut terminate = signal(SignalKind::terminate())?;
        let mut hangup = signal(SignalKind::hangup())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res?,
            _ = terminate.recv() => {}
            _ = hangup.recv() => {}
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;
    Ok(())
}
