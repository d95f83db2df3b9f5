use std::time::Duration;

use minihub::{
    config::{CityConfig, GuessNumberConfig, HubConfig, TimeZoneConfig},
    mini_app::{MiniAppId, MiniAppKind, ViewAction, ViewFrame},
    navigation::Screen,
    router::{CellType, DensityMode},
    HubError, HubResult, MiniHub,
};
use pretty_assertions::assert_eq;
use tokio::{sync::watch, time::timeout};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[ctor::ctor]
fn init_tests() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

fn time_zone_config(location: Option<CityConfig>) -> TimeZoneConfig {
    TimeZoneConfig {
        refresh_interval: Duration::from_millis(50),
        reference_cities: vec![CityConfig::new("London", 0), CityConfig::new("Tokyo", 540)],
        location,
    }
}

async fn top_frames(hub: &MiniHub) -> HubResult<Option<watch::Receiver<ViewFrame>>> {
    hub.navigation()
        .with_top(|entry| match &entry.screen {
            Screen::MiniApp(controller) => Some(controller.frames()),
            Screen::Root(_) => None,
        })
        .await
}

async fn wait_for_top<F>(hub: &MiniHub, predicate: F) -> ViewFrame
where
    F: FnMut(&ViewFrame) -> bool,
{
    let mut frames = top_frames(hub)
        .await
        .unwrap()
        .expect("a mini-app should be open");
    let frame = timeout(Duration::from_secs(1), frames.wait_for(predicate))
        .await
        .expect("frame did not update in time")
        .expect("controller closed")
        .clone();
    frame
}

#[tokio::test]
async fn test_six_iterations_of_two_kinds() {
    let hub = MiniHub::new(HubConfig {
        mini_apps: vec![MiniAppKind::GuessNumber, MiniAppKind::TimeZone],
        load_iterations: 6,
        ..Default::default()
    })
    .await
    .unwrap();
    let root = hub.start().await;

    assert_eq!(root.number_of_rows(), 12);
    let names: Vec<String> = (0..12)
        .map(|i| root.model(i).unwrap().app_name)
        .collect();
    let expected: Vec<String> = (0..12)
        .map(|i| if i % 2 == 0 { "Guess Number" } else { "Time Zone" }.to_string())
        .collect();
    assert_eq!(names, expected);

    for model in hub.manager().models().iter() {
        assert!(hub.manager().get_mini_app(&model.app_id).await.is_some());
    }
    hub.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unknown_id_is_ignored() {
    let hub = MiniHub::new(HubConfig::default()).await.unwrap();
    let unknown = MiniAppId::from("not-a-real-id");

    assert!(hub
        .manager()
        .get_full_screen_controller(&unknown)
        .await
        .is_none());
    assert!(hub.manager().get_interactive_view(&unknown).await.is_none());
    hub.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_density_toggle_and_heights() {
    let hub = MiniHub::new(HubConfig::default()).await.unwrap();
    let root = hub.start().await;

    assert_eq!(root.height_for_row(160.0), 20.0);
    assert_eq!(root.toggle_density_mode(), DensityMode::Interactive);
    assert_eq!(root.height_for_row(160.0), 80.0);

    let row = root.row(0).await.unwrap();
    assert_eq!(row.cell_type, CellType::Interactive);
    assert!(row.interactive_view.is_some());

    assert_eq!(root.toggle_density_mode(), DensityMode::Compact);
    assert_eq!(root.height_for_row(160.0), 20.0);
    hub.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_three_misses_then_a_win() {
    let hub = MiniHub::new(HubConfig {
        mini_apps: vec![MiniAppKind::GuessNumber],
        guess_number: GuessNumberConfig { min: 50, max: 50 },
        ..Default::default()
    })
    .await
    .unwrap();
    hub.start().await;
    assert!(hub.open(0).await.unwrap());

    hub.say("10").await.unwrap();
    hub.say("90").await.unwrap();
    hub.say("49").await.unwrap();
    hub.say("50").await.unwrap();

    let frame = wait_for_top(&hub, |f| f.contains("Best score: 4")).await;
    assert!(frame.contains("in 4 attempts"));

    // the inline widget reads the same score
    let widget = hub.act(0, &ViewAction::Refresh).await.unwrap();
    assert!(widget.contains("Best score: 4"));
    hub.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_location_failure_then_no_payload() {
    let hub = MiniHub::new(HubConfig {
        mini_apps: vec![MiniAppKind::TimeZone],
        time_zone: time_zone_config(None),
        ..Default::default()
    })
    .await
    .unwrap();
    hub.start().await;
    assert!(hub.open(0).await.unwrap());

    wait_for_top(&hub, |f| f.contains("Location unavailable.")).await;

    // ticks keep coming, the screen stays failed
    tokio::time::sleep(Duration::from_millis(150)).await;
    let frame = top_frames(&hub).await.unwrap().unwrap().borrow().clone();
    assert!(frame.contains("Location unavailable."));
    assert!(!frame.contains("Tokyo"));
    hub.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_location_success_lists_cities() {
    let hub = MiniHub::new(HubConfig {
        mini_apps: vec![MiniAppKind::TimeZone],
        time_zone: time_zone_config(Some(CityConfig::new("Lisbon", 0))),
        ..Default::default()
    })
    .await
    .unwrap();
    hub.start().await;
    assert!(hub.open(0).await.unwrap());

    let frame = wait_for_top(&hub, |f| f.contains("Lisbon:")).await;
    assert!(frame.contains("London"));
    assert!(frame.contains("Tokyo"));

    assert_eq!(hub.back().await.as_deref(), Some("Time Zone"));
    assert_eq!(hub.navigation().depth().await, 1);
    hub.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unusable_configs_are_rejected_up_front() {
    let result = MiniHub::new(HubConfig {
        guess_number: GuessNumberConfig { min: 50, max: 10 },
        ..Default::default()
    })
    .await;
    assert!(matches!(result, Err(HubError::Config(_))));

    let result = MiniHub::new(HubConfig {
        mini_apps: vec![MiniAppKind::TimeZone],
        time_zone: TimeZoneConfig {
            reference_cities: Vec::new(),
            ..time_zone_config(Some(CityConfig::new("Lisbon", 0)))
        },
        ..Default::default()
    })
    .await;
    assert!(matches!(result, Err(HubError::Config(_))));

    let result = MiniHub::new(HubConfig {
        time_zone: TimeZoneConfig {
            refresh_interval: Duration::ZERO,
            ..time_zone_config(None)
        },
        ..Default::default()
    })
    .await;
    assert!(matches!(result, Err(HubError::Config(_))));
}
