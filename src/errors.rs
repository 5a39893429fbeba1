use color_eyre::{
    config::HookBuilder,
    Result,
};
use redis_dashboard_config::Environment;

/// Installs the `color-eyre` report handler and a panic hook.
///
/// In development panics print a full `better-panic` backtrace, anywhere else `human-panic` writes a
/// crash report and prints where to find it.
pub fn init_errors(environment: Environment) -> Result<()> {
    let (panic_hook, eyre_hook) = HookBuilder::default()
        .panic_section(format!(
            "This is a bug. Consider reporting it at {}",
            env!("CARGO_PKG_REPOSITORY")
        ))
        .display_location_section(environment.is_development())
        .display_env_section(environment.is_development())
        .into_hooks();
    eyre_hook.install()?;

    let panic_hook = panic_hook.into_panic_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        if environment.is_development() {
            better_panic::Settings::auto()
                .most_recent_first(false)
                .lineno_suffix(true)
                .verbosity(better_panic::Verbosity::Full)
                .create_panic_handler()(panic_info);
        } else {
            let metadata = human_panic::metadata!();
            let file_path = human_panic::handle_dump(&metadata, panic_info);
            // Falls back to the color-eyre report if the friendly message can't be printed.
            if human_panic::print_msg(file_path, &metadata).is_err() {
                panic_hook(panic_info);
            }
        }

        std::process::exit(1);
    }));

    Ok(())
}
