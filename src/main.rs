use anyhow::Result;
use clap::Parser;
use skill_bridge::{
    create_router, AppState, Config, DirectiveComposer, MemoryPersistence, SkillSettings,
    StaticCatalog,
};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "skill-bridge", about = "Voice-skill to game-client bridge backend")]
struct Args {
    /// Config file to load (extension inferred)
    #[arg(long, default_value = "config/skill-bridge")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("skill-bridge v0.1.0");
    info!("Loaded config: {}", cfg.service.name);
    info!("Game client URL: {}", cfg.skill.game_url);

    let composer = Arc::new(DirectiveComposer::new(
        Arc::new(MemoryPersistence::new()),
        Arc::new(StaticCatalog::default()),
        SkillSettings {
            game_url: cfg.skill.game_url,
            hint: cfg.skill.hint,
        },
    ));

    let state = AppState::new(composer);
    let app = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Skill invoke endpoint listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
