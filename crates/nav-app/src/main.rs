//! Text-mode navigation demo

use std::sync::Arc;

use anyhow::{Context, Result};
use nav_core::NavigationEngine;
use nav_host::{EngineHost, SavedHostState};
use nav_render::{CompletionScheduler, ImmediateScheduler, ViewRenderer};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod scheduler;
mod screens;
mod settings;

use commands::{Command, HELP};
use scheduler::TokioScheduler;
use screens::{DemoKey, DemoViewFactory};
use settings::DemoSettings;

/// Demo state: the engine host plus the window currently rendering it
struct DemoApp {
    settings: DemoSettings,
    factory: DemoViewFactory,
    host: EngineHost<DemoKey>,

    /// Renderer attached to the default root, `None` between windows
    window: Option<Arc<ViewRenderer<DemoKey>>>,

    /// JSON written by the last `save`
    saved: Option<String>,
}

impl DemoApp {
    fn new(settings: DemoSettings, factory: DemoViewFactory) -> Result<Self> {
        let host = EngineHost::with_serde_codec(settings.host.clone());
        let mut app = Self {
            settings,
            factory,
            host,
            window: None,
            saved: None,
        };
        app.open_window(None)?;
        Ok(app)
    }

    /// Attach a fresh renderer to the default root
    fn open_window(&mut self, saved: Option<&SavedHostState>) -> Result<()> {
        let engine = self.host.attach_default_engine(saved)?;
        let renderer = Arc::new(self.factory.renderer());
        engine.set_render_collaborator(renderer.clone())?;
        if !engine.has_root() && !engine.has_pending_transition() {
            engine.set_root(DemoKey::Home)?;
        }
        self.window = Some(renderer);
        Ok(())
    }

    fn engine(&self) -> Result<NavigationEngine<DemoKey>> {
        self.host.default_engine().context("No root engine attached")
    }

    /// Run one command; `false` means the demo should exit
    fn execute(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Push(key) => self.engine()?.push(key)?,
            Command::Replace(key) => self.engine()?.replace_top(key)?,
            Command::Root(key) => self.engine()?.set_root(key)?,
            Command::Split => self.engine()?.push(DemoKey::Split)?,
            Command::Pop => {
                if !self.engine()?.pop()? {
                    println!("Nothing to pop");
                }
            }
            Command::Back => {
                if !self.host.handle_back()? {
                    info!("Back was not consumed, leaving");
                    return Ok(false);
                }
            }
            Command::ChildPush { tag, key } => {
                let child = self.engine()?.get_child_engine(&DemoKey::Split, &tag)?;
                child.push(key)?;
            }
            Command::Pause => self.host.on_pause(),
            Command::Resume => self.host.on_resume()?,
            Command::Save => {
                let json = self.host.on_save()?.to_json()?;
                println!("{}", json);
                self.saved = Some(json);
            }
            Command::Restore => self.restore()?,
            Command::Show => println!("{}", self.describe()?),
            Command::Help => println!("{}", HELP),
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Tear down the window and host, then rebuild both from the saved JSON
    fn restore(&mut self) -> Result<()> {
        let json = self.saved.as_deref().context("Nothing saved yet, use save first")?;
        let saved = SavedHostState::from_json(json)?;

        self.host.on_destroyed(false)?;
        self.window = None;
        self.host = EngineHost::with_serde_codec(self.settings.host.clone());
        self.open_window(Some(&saved))?;
        info!("Restored {} root engines", saved.engines.len());
        Ok(())
    }

    fn describe(&self) -> Result<String> {
        let engine = self.engine()?;
        let mut out = format!(
            "stack: {:?} ({} pending){}",
            engine.stack(),
            engine.pending_transition_count(),
            if self.host.is_foreground() { "" } else { " [paused]" }
        );
        for child in engine.children() {
            out.push_str(&format!(
                "\n  child {:?}/{}: {:?} tokens {:?}",
                child.owner_key(),
                child.scope_tag(),
                child.stack(),
                child.ordering_indices()
            ));
        }
        if let Some(window) = &self.window {
            out.push_str(&format!("\n{}", window.container().lock().render()));
        }
        Ok(out)
    }

    fn print_frames(&self) {
        if !self.settings.show_frames {
            return;
        }
        if let Some(window) = &self.window {
            for frame in window.container().lock().take_frames() {
                println!("  ~ {}", frame);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = DemoSettings::load()?;
    info!("Starting navigation demo (animations: {})", settings.animate);

    let scheduler: Arc<dyn CompletionScheduler> = if settings.animate {
        Arc::new(TokioScheduler::new(
            tokio::runtime::Handle::current(),
            settings.animation_scale,
        ))
    } else {
        Arc::new(ImmediateScheduler)
    };
    let mut app = DemoApp::new(settings, DemoViewFactory::new(scheduler))?;

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match app.execute(command) {
            Ok(true) => app.print_frames(),
            Ok(false) => break,
            Err(e) => error!("{:#}", e),
        }
    }

    info!("Navigation demo finished");
    Ok(())
}
