// What you SEE:
// • A black window; once the logo has loaded, thousands of white particles
//   trace its shape in the middle.
// • Move the mouse near the logo: particles jump away and turn blue, then
//   drift back when you leave.
// • Resize the window: the logo is redrawn and the particles reseeded.
// • ESC or closing the window quits.
//
// Usage: particle-logo [config.toml]

use std::path::PathBuf;

use particle_logo::draw::Drawer;
use particle_logo::{Animation, Config, Error, LogoLoader, LogoSource};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Error> {
    /* --- Configuration ---
       File (explicit or ./particle-logo.toml) -> env overrides -> validate. */
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let mut config = Config::load_or_default(config_path.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    config.apply_env_overrides();
    config.validate()?;
    match &config_path {
        Some(path) => tracing::info!(path = %path.display(), "configuration loaded"),
        None => tracing::info!("configuration loaded (defaults or ./particle-logo.toml)"),
    }

    /* --- Logo load starts first ---
       Visual: nothing yet; the window stays black until it resolves. */
    let loader = LogoLoader::spawn(LogoSource::parse(&config.logo.source));

    /* --- Window ---
       Visual: an empty black window of the configured size. */
    let win = &config.window;
    let mut drawer = Drawer::new(&win.title, win.width, win.height, win.target_fps, win.touch_emulation)?;
    let (w, h) = drawer.size();

    /* --- Frame loop ---
       A failed logo load ends the loop; dropping the drawer closes the window
       so no dead canvas is left behind. */
    let mut animation = Animation::new(config, loader, w, h);
    let result = animation.run(&mut drawer);
    drop(drawer);

    if let Err(e) = &result {
        tracing::error!(error = %e, "animation stopped");
    }
    result
}
