//! Shows the neon cube in a desktop window.
//!
//! `NEON_CUBE_SEED` overrides the particle seed.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use anyhow::Context;
    use neon_cube::config::SceneConfig;

    let mut config = SceneConfig::default();
    if let Ok(seed) = std::env::var("NEON_CUBE_SEED") {
        config.particle_seed = seed
            .parse()
            .with_context(|| format!("NEON_CUBE_SEED is not a number: {seed:?}"))?;
    }
    neon_cube::native::run_preview(config)
}

#[cfg(target_arch = "wasm32")]
fn main() {}
