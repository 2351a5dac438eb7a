use std::time::Duration;

use audio_io::{
    CallbackFlow, CallbackInfo, DuplexPlayer, PlayerConfig, set_logging_enabled,
};

const RUN_FOR: Duration = Duration::from_secs(5);

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    set_logging_enabled(true);

    // Monitor: whatever is captured is played straight back.
    let passthrough = |input: &[i16], output: &mut [i16], _: &CallbackInfo| {
        output.copy_from_slice(input);
        CallbackFlow::Continue
    };

    let mut player = match DuplexPlayer::new(PlayerConfig::default(), passthrough) {
        Ok(player) => player,
        Err(e) => {
            log::error!("Failed to initialize audio: {e}");
            return;
        }
    };

    match player.start() {
        Ok(()) => {
            log::info!("Duplex stream started.");
            std::thread::sleep(RUN_FOR);
        }
        Err(e) => log::error!("Failed to start duplex stream: {e}"),
    }

    if let Err(e) = player.terminate() {
        log::error!("Failed to shut down audio: {e}");
    }
}
