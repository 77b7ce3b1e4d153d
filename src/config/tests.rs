use clap::Parser;

use super::*;

#[test]
fn defaults_bind_localhost_3000_in_dev() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");
    assert_eq!(settings.server.addr.port(), 3000);
    assert!(!settings.site.production);
    assert!(!settings.site.serverless);
    assert_eq!(settings.site.dist_dir, "dist");
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn invalid_public_url_is_rejected_with_its_key() {
    let mut raw = RawSettings::default();
    raw.site.public_url = Some("not a url".to_string());

    match Settings::from_raw(raw) {
        Err(LoadError::Invalid { key, .. }) => assert_eq!(key, "site.public_url"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn absolute_dist_dir_is_rejected() {
    let mut raw = RawSettings::default();
    raw.site.dist_dir = Some("/srv/dist".to_string());
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn zero_port_is_rejected() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(0);
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn mode_resolution_covers_the_whole_truth_table() {
    assert_eq!(
        RenderMode::resolve(false, false),
        RenderMode::InteractiveDev
    );
    assert_eq!(RenderMode::resolve(false, true), RenderMode::InteractiveDev);
    assert_eq!(
        RenderMode::resolve(true, false),
        RenderMode::StaticProduction
    );
    assert_eq!(RenderMode::resolve(true, true), RenderMode::Serverless);
}

#[test]
fn mode_resolution_is_stable_for_equal_inputs() {
    for production in [false, true] {
        for serverless in [false, true] {
            assert_eq!(
                RenderMode::resolve(production, serverless),
                RenderMode::resolve(production, serverless)
            );
        }
    }
}

#[test]
fn dev_paths_resolve_against_the_source_tree() {
    let mut raw = RawSettings::default();
    raw.site.root = Some(PathBuf::from("/srv/site"));
    let settings = Settings::from_raw(raw).expect("valid settings");

    let paths = SitePaths::for_mode(RenderMode::InteractiveDev, &settings.site);
    assert_eq!(paths.shell, PathBuf::from("/srv/site/index.html"));
    assert_eq!(paths.content, PathBuf::from("/srv/site/content"));
    assert_eq!(paths.styles, PathBuf::from("/srv/site/styles"));
    assert_eq!(paths.assets, PathBuf::from("/srv/site/public"));
}

#[test]
fn production_paths_resolve_under_the_root_dist() {
    let mut raw = RawSettings::default();
    raw.site.root = Some(PathBuf::from("/srv/site"));
    let settings = Settings::from_raw(raw).expect("valid settings");

    let paths = SitePaths::for_mode(RenderMode::StaticProduction, &settings.site);
    assert_eq!(paths.shell, PathBuf::from("/srv/site/dist/index.html"));
    assert_eq!(paths.content, PathBuf::from("/srv/site/dist/content"));
    assert_eq!(paths.assets, PathBuf::from("/srv/site/dist/assets"));
}

#[test]
fn serverless_paths_are_relative_to_the_working_directory() {
    let mut raw = RawSettings::default();
    raw.site.root = Some(PathBuf::from("/srv/site"));
    let settings = Settings::from_raw(raw).expect("valid settings");

    let paths = SitePaths::for_mode(RenderMode::Serverless, &settings.site);
    assert_eq!(paths.shell, PathBuf::from("dist/index.html"));
    assert_eq!(paths.content, PathBuf::from("dist/content"));
    assert_eq!(paths.assets, PathBuf::from("dist/assets"));
}

#[test]
fn render_command_always_reads_the_build_output() {
    let mut raw = RawSettings::default();
    let args = RenderArgs {
        url: "/".to_string(),
        language: None,
        site_root: Some(PathBuf::from("/srv/site")),
    };
    raw.apply_render_overrides(&args);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(settings.site.production);
    assert_eq!(settings.site.root, PathBuf::from("/srv/site"));
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["vetrina"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_render_arguments() {
    let args = CliArgs::parse_from(["vetrina", "render", "/experience", "--language", "it"]);
    match args.command.expect("render command") {
        Command::Render(render) => {
            assert_eq!(render.url, "/experience");
            assert_eq!(render.language.as_deref(), Some("it"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}
