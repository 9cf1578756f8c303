//! Tests for configuration parsing and board selection.

use super::{ConfigError, ConfigFile, IntakeConfig, TASKS_FILE_NAME};
use crate::intake::services::{DEFAULT_FALLBACK_LIST_NAME, DEFAULT_LABEL_COLOR};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use rstest::{fixture, rstest};

const SAMPLE: &str = r#"{
  "authorization": { "PLANKA_API_URL": "https://boards.example/api" },
  "default": { "PLANKA_BOARD_ID": "default-board" },
  "projects": {
    "/work": { "PLANKA_BOARD_ID": "work-board" },
    "/work/api": { "PLANKA_BOARD_ID": "api-board" },
    "/work/empty": {}
  },
  "intake": { "locale": "de-CH", "taskListName": "Checklist", "verbose": true }
}"#;

#[fixture]
fn config_file() -> ConfigFile {
    serde_json::from_str(SAMPLE).expect("sample configuration parses")
}

#[rstest]
#[case("/work/api/src", "api-board", Some("/work/api"))]
#[case("/work/web", "work-board", Some("/work"))]
#[case("/home/ana", "default-board", None)]
#[case("/workshop", "default-board", None)]
fn selects_deepest_matching_project(
    config_file: ConfigFile,
    #[case] working_dir: &str,
    #[case] board: &str,
    #[case] project: Option<&str>,
) {
    let config = IntakeConfig::resolve(&config_file, Utf8Path::new("/cfg"), Utf8Path::new(working_dir))
        .expect("board resolves");

    assert_eq!(config.settings().board_id().as_str(), board);
    assert_eq!(config.project_dir(), project.map(Utf8Path::new));
}

#[rstest]
fn project_tasks_live_in_the_project(config_file: ConfigFile) {
    let config = IntakeConfig::resolve(
        &config_file,
        Utf8Path::new("/cfg"),
        Utf8Path::new("/work/api"),
    )
    .expect("board resolves");

    assert_eq!(config.tasks_path(), Utf8Path::new("/work/api").join(TASKS_FILE_NAME));
}

#[rstest]
fn default_tasks_live_in_the_config_dir(config_file: ConfigFile) {
    let config = IntakeConfig::resolve(&config_file, Utf8Path::new("/cfg"), Utf8Path::new("/tmp"))
        .expect("board resolves");

    assert_eq!(config.tasks_path(), Utf8Path::new("/cfg").join(TASKS_FILE_NAME));
}

#[rstest]
fn project_without_board_is_an_error(config_file: ConfigFile) {
    let result = IntakeConfig::resolve(
        &config_file,
        Utf8Path::new("/cfg"),
        Utf8Path::new("/work/empty/docs"),
    );

    assert!(matches!(result, Err(ConfigError::MissingBoardId { .. })));
}

#[rstest]
fn intake_section_overrides_defaults(config_file: ConfigFile) {
    let config = IntakeConfig::resolve(&config_file, Utf8Path::new("/cfg"), Utf8Path::new("/"))
        .expect("board resolves");
    let settings = config.settings();

    assert_eq!(settings.locale().as_str(), "de-CH");
    assert_eq!(settings.task_list_name(), "Checklist");
    assert_eq!(settings.default_label_color(), DEFAULT_LABEL_COLOR);
    assert_eq!(settings.fallback_list_name(), DEFAULT_FALLBACK_LIST_NAME);
    assert!(config.log().verbose);
    assert!(!config.log().silent);
}

#[test]
fn empty_file_has_no_board() {
    let file: ConfigFile = serde_json::from_str("{}").expect("empty object parses");
    let result = IntakeConfig::resolve(&file, Utf8Path::new("/cfg"), Utf8Path::new("/"));

    assert!(matches!(result, Err(ConfigError::MissingBoardId { .. })));
}

#[test]
fn load_from_reads_the_config_file() {
    let dir_path = Utf8PathBuf::from_path_buf(std::env::temp_dir())
        .expect("temp dir is UTF-8")
        .join(format!("intake-config-{}", uuid::Uuid::new_v4()));
    Dir::create_ambient_dir_all(&dir_path, ambient_authority()).expect("create temp dir");
    let dir = Dir::open_ambient_dir(&dir_path, ambient_authority()).expect("open temp dir");
    dir.write("config.json", SAMPLE).expect("write config");

    let config = IntakeConfig::load_from(&dir_path, Utf8Path::new("/elsewhere"))
        .expect("configuration loads");

    assert_eq!(config.settings().board_id().as_str(), "default-board");
    assert_eq!(config.tasks_path(), dir_path.join(TASKS_FILE_NAME));
    dir.remove_file("config.json").expect("remove config");
}

#[test]
fn missing_file_is_a_read_error() {
    let dir_path = Utf8PathBuf::from_path_buf(std::env::temp_dir())
        .expect("temp dir is UTF-8")
        .join(format!("intake-missing-{}", uuid::Uuid::new_v4()));

    let result = IntakeConfig::load_from(&dir_path, Utf8Path::new("/"));

    assert!(matches!(result, Err(ConfigError::Read { .. })));
}

#[test]
fn malformed_file_is_a_parse_error() {
    let dir_path = Utf8PathBuf::from_path_buf(std::env::temp_dir())
        .expect("temp dir is UTF-8")
        .join(format!("intake-malformed-{}", uuid::Uuid::new_v4()));
    Dir::create_ambient_dir_all(&dir_path, ambient_authority()).expect("create temp dir");
    let dir = Dir::open_ambient_dir(&dir_path, ambient_authority()).expect("open temp dir");
    dir.write("config.json", "{ not json").expect("write config");

    let result = IntakeConfig::load_from(&dir_path, Utf8Path::new("/"));

    assert!(matches!(result, Err(ConfigError::Parse { .. })));
    dir.remove_file("config.json").expect("remove config");
}
