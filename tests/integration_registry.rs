use pane_kit::collaborators::{ConfirmDialog, UiTree};
use pane_kit::config::PaneConfig;
use pane_kit::drivers::headless;
use pane_kit::manager::NO_TITLE;
use pane_kit::pane::PANE_MARKER_CLASS;
use pane_kit::selector::Selector;
use pane_kit::{ErrorKind, LoadOption, LoadStep, PaneBuilder, PaneError};

fn idle(title: &str) -> PaneConfig {
    PaneConfig {
        pane_refresh_on_first_access: false,
        pane_header_title: title.to_string(),
        ..PaneConfig::with_action_url("/api/pane")
    }
}

#[test]
fn blank_ids_are_configuration_errors() {
    let mut h = headless();
    for id in ["", "   "] {
        let err = h.manager.create(PaneBuilder::new(id)).unwrap_err();
        assert!(matches!(err, PaneError::MissingId));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
    assert!(h.manager.is_empty());
}

#[test]
fn duplicate_ids_are_uniqueness_errors() {
    let mut h = headless();
    h.manager
        .create(PaneBuilder::new("p1").config(idle("")))
        .unwrap();
    let err = h
        .manager
        .create(PaneBuilder::new("p1").config(idle("")))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Uniqueness);
    assert!(err.to_string().contains("p1"));
    assert_eq!(h.manager.len(), 1);
}

#[test]
fn blank_refresh_parameter_fails_construction() {
    let mut h = headless();
    let err = h
        .manager
        .create(PaneBuilder::new("p1").config(PaneConfig {
            refresh_parameter_name: " ".into(),
            ..idle("")
        }))
        .unwrap_err();
    assert!(matches!(err, PaneError::BlankRefreshParameter));
    assert!(h.manager.is_empty());
}

#[test]
fn modified_panes_are_reported_in_registration_order() {
    let mut h = headless();
    for (id, title) in [("p1", " Customer "), ("p2", "  "), ("p3", "Orders")] {
        h.form.insert_field(id, None, "name", "Ada");
        h.manager
            .create(PaneBuilder::new(id).config(idle(title)))
            .unwrap();
    }
    assert!(!h.manager.is_any_pane_modified());
    assert_eq!(h.manager.ids().collect::<Vec<_>>(), vec!["p1", "p2", "p3"]);

    h.form.set_value("p2", "name", "Grace");
    h.form.set_value("p1", "name", "Grace");
    let modified = h.manager.all_modified_pane_columns();
    let summary: Vec<_> = modified
        .iter()
        .map(|m| (m.id.as_str(), m.title.as_str(), m.columns.len()))
        .collect();
    assert_eq!(summary, vec![("p1", " Customer ", 1), ("p2", NO_TITLE, 1)]);
    assert!(h.manager.is_any_pane_modified());

    h.manager.destroy("p1").unwrap();
    h.manager
        .pane_mut("p2")
        .unwrap()
        .reset_modified_columns(None);
    assert!(!h.manager.is_any_pane_modified());
}

#[test]
fn destroy_releases_the_pane() {
    let mut h = headless();
    let p1 = Selector::pane("p1");
    h.manager
        .create(PaneBuilder::new("p1").config(idle("")))
        .unwrap();
    assert!(h.tree.has_class(&p1, PANE_MARKER_CLASS));
    assert_eq!(h.disablers.attached(), 1);

    h.manager.destroy("p1").unwrap();
    assert!(!h.tree.has_class(&p1, PANE_MARKER_CLASS));
    assert!(h.manager.pane("p1").is_none());
    assert!(matches!(
        h.manager.destroy("p1"),
        Err(PaneError::UnknownPane { .. })
    ));
    assert!(h.manager.try_pane_mut("p1").is_err());

    h.manager
        .create(PaneBuilder::new("p1").config(idle("")))
        .unwrap();
    assert_eq!(h.manager.len(), 1);
}

#[test]
fn destroying_the_dialog_owner_closes_the_dialog() {
    let mut h = headless();
    let mut pane = h
        .manager
        .create(PaneBuilder::new("p1").config(idle("")))
        .unwrap();
    assert_eq!(pane.load(LoadOption::PromptAlways), LoadStep::Prompting);
    h.manager.destroy("p1").unwrap();
    assert!(!h.dialog.is_open());
    assert_eq!(h.manager.env().dialog_owner(), None);
}

#[test]
fn json_options_are_lenient_about_booleans() {
    let mut h = headless();
    let config = PaneConfig::from_json_str(
        r#"{
            "paneActionUrl": "/api/p1",
            "paneRefreshOnFirstAccess": "no",
            "enablePaneHeader": "TRUE",
            "paneHeaderTitle": "Customer",
            "paneHeaderAlign": "right"
        }"#,
    )
    .unwrap();
    h.manager
        .create(PaneBuilder::new("p1").config(config))
        .unwrap();
    let header = h.tree.header(&Selector::pane("p1")).unwrap();
    assert_eq!(header.title, "Customer");
    assert_eq!(header.align_class, "pane-header-title-bar-right");
    assert!(h.transport.issued().is_empty());
}
