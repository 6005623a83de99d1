//! Settings persistence and the settings-form path into the control loop.

use humidistat::app::commands::AppCommand;
use humidistat::app::ports::{SettingsError, StorageError, StoragePort};
use humidistat::app::service::ControlLoop;
use humidistat::config::ControllerConfig;
use humidistat::settings::{self, ControlSettings};
use humidistat::ui;

use crate::mock_hw::{MemStorage, MockClock, MockHardware, RecordingSink};

const NAMESPACE: &str = "humidistat";
const KEY: &str = "settings";

#[test]
fn empty_storage_loads_defaults() {
    let storage = MemStorage::new();
    assert_eq!(
        settings::try_load(&storage),
        Err(SettingsError::StorageRead(StorageError::NotFound))
    );
    assert_eq!(settings::load(&storage), ControlSettings::default());
}

#[test]
fn saved_settings_survive_a_reboot() {
    let mut storage = MemStorage::new();
    let s = ControlSettings {
        high_threshold: 750,
        low_threshold: -20,
        timezone_offset_hours: -8,
    };
    settings::save(&mut storage, &s).unwrap();

    assert_eq!(storage.raw(NAMESPACE, KEY), Some(&s.encode()[..]));
    assert_eq!(settings::load(&storage), s);
}

#[test]
fn truncated_region_falls_back_to_defaults() {
    let mut storage = MemStorage::new();
    storage.write(NAMESPACE, KEY, &[0x02, 0x58, 0x01]).unwrap();

    assert_eq!(settings::try_load(&storage), Err(SettingsError::Truncated(3)));
    assert_eq!(settings::load(&storage), ControlSettings::default());
}

#[test]
fn oversized_region_falls_back_to_defaults() {
    let mut storage = MemStorage::new();
    storage.write(NAMESPACE, KEY, &[0x02, 0x58, 0x01, 0x2C, 0x00, 0x02, 0xFF]).unwrap();

    assert_eq!(
        settings::try_load(&storage),
        Err(SettingsError::StorageRead(StorageError::IoError))
    );
    assert_eq!(settings::load(&storage), ControlSettings::default());
}

#[test]
fn write_failure_is_reported() {
    let mut storage = MemStorage::failing();
    assert_eq!(
        settings::save(&mut storage, &ControlSettings::default()),
        Err(SettingsError::StorageWrite(StorageError::IoError))
    );
    assert!(!storage.exists(NAMESPACE, KEY));
}

#[test]
fn form_post_reaches_storage_and_setpoint() {
    let clock = MockClock::at(14, 0);
    let mut hw = MockHardware::new(600);
    let mut sink = RecordingSink::new();
    let mut storage = MemStorage::new();
    let mut cl = ControlLoop::new(ControllerConfig::default(), settings::load(&storage));

    let form = ui::parse_settings_form("highValue=650&lowValue=320&offset=%2B2");
    cl.handle_command(AppCommand::UpdateSettings(form), &mut storage, &mut sink);
    cl.tick(&clock, &mut hw, &mut sink);

    // 14:00 UTC + 2h is daytime
    assert_eq!(cl.setpoint(), 650.0);

    let reloaded = settings::load(&storage);
    assert_eq!(
        reloaded,
        ControlSettings {
            high_threshold: 650,
            low_threshold: 320,
            timezone_offset_hours: 2,
        }
    );

    let html = ui::render_index(&cl.status_view(&clock));
    assert!(html.contains("Current humidity: 424.00"));
    assert!(html.contains("Current time: 16:00:00"));
}

#[test]
fn blank_form_is_accepted_as_zeroes() {
    let mut storage = MemStorage::new();
    let mut sink = RecordingSink::new();
    let mut cl = ControlLoop::new(ControllerConfig::default(), ControlSettings::default());

    let form = ui::parse_settings_form("");
    cl.handle_command(AppCommand::UpdateSettings(form), &mut storage, &mut sink);

    let zero = ControlSettings {
        high_threshold: 0,
        low_threshold: 0,
        timezone_offset_hours: 0,
    };
    assert_eq!(cl.settings(), zero);
    assert_eq!(settings::load(&storage), zero);
}
