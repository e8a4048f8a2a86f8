use pretty_assertions::assert_eq;
use stainless_service::Settings;

// Temporary directory and parallelism depend on the machine running the
// tests, so they are taken from the defaults.
fn rewrite_machine_specific_settings(example_settings: &mut Settings, default_settings: &Settings) {
    example_settings.verifier.cache_dir = default_settings.verifier.cache_dir.clone();
    example_settings.tools.max_threads = default_settings.tools.max_threads;
}

#[test]
fn test_example_settings() {
    std::env::set_var("STAINLESS_SERVICE__CONFIG", "config/base.toml");
    let (example_settings, default_settings) = {
        let mut example_settings = Settings::new().expect("Failed to parse config");
        let default_settings = Settings::default();

        rewrite_machine_specific_settings(&mut example_settings, &default_settings);

        (example_settings, default_settings)
    };
    assert_eq!(default_settings, example_settings);
}
