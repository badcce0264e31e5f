use notelinker_settings::{LookupProvider, Settings, SettingsStore};
use notelinker_triggers::DateFormat;
use tempfile::tempdir;

#[test]
fn missing_file_loads_sanitized_defaults() {
    let dir = tempdir().unwrap();
    let store = SettingsStore::load(dir.path().join("settings.json")).unwrap();
    assert_eq!(store.settings(), &Settings::default());
}

#[test]
fn update_round_trips_through_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("conf").join("settings.json");

    {
        let mut store = SettingsStore::load(&path).unwrap();
        store
            .update(|settings| {
                settings.date_format = DateFormat::MonthDayYearSlash;
                settings.lookup.provider = LookupProvider::Github;
                settings.lookup.base_url = "https://api.github.com/".into();
            })
            .unwrap();
    }

    let store = SettingsStore::load(&path).unwrap();
    assert_eq!(store.settings().date_format, DateFormat::MonthDayYearSlash);
    assert_eq!(store.settings().lookup.provider, LookupProvider::Github);
    assert_eq!(store.settings().lookup.base_url, "https://api.github.com");
}

#[test]
fn corrupt_date_format_token_survives_a_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{ "version": 1, "date_format": "whenever" }"#).unwrap();

    let store = SettingsStore::load(&path).unwrap();
    assert_eq!(store.settings().date_format, DateFormat::Iso);
}

#[test]
fn import_backs_up_the_previous_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let incoming = dir.path().join("incoming.json");

    let mut store = SettingsStore::load(&path).unwrap();
    store.save().unwrap();
    std::fs::write(&incoming, r#"{ "version": 1, "date_format": "DD-MM-YYYY" }"#).unwrap();

    store.import_from(&incoming).unwrap();
    assert_eq!(store.settings().date_format, DateFormat::DayMonthYear);
    assert!(path.with_extension("bak").exists());
}

#[test]
fn export_writes_a_readable_copy() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let exported = dir.path().join("out").join("settings.json");

    let store = SettingsStore::load(&path).unwrap();
    store.export_to(&exported).unwrap();

    let copy = SettingsStore::load(&exported).unwrap();
    assert_eq!(copy.settings(), store.settings());
}
