use geofence::{Geofence, GeofenceBuilder};
use geofence_types::{AreaGeometry, NewProvider, ServiceAreaPatch};
use tempfile::{NamedTempFile, tempdir};

fn new_provider(name: &str) -> NewProvider {
    NewProvider {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone_number: "5541988887777".to_string(),
        language: "pt-BR".to_string(),
        currency: "USD".to_string(),
    }
}

fn open(path: &std::path::Path) -> Geofence {
    GeofenceBuilder::new().snapshot_path(path).build().unwrap()
}

#[test]
fn test_restart_rebuilds_index() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("geofence.snapshot");

    let zone_id = {
        let geofence = open(&path);
        let acme = geofence.create_provider(new_provider("Acme")).unwrap();
        let zone = geofence
            .register(
                acme.id,
                "Zone1",
                10_000,
                AreaGeometry::Ring(vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]]),
            )
            .unwrap();
        zone.id
    };

    let geofence = open(&path);
    let stats = geofence.stats().unwrap();
    assert_eq!(stats.store.providers, 1);
    assert_eq!(stats.index.areas, 1);

    let hits = geofence.locate(0.5, 0.5).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, zone_id);
    assert_eq!(hits[0].provider_name, "Acme");
}

#[test]
fn test_restart_sees_updates_and_deletes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("geofence.snapshot");

    {
        let geofence = open(&path);
        let acme = geofence.create_provider(new_provider("Acme")).unwrap();
        let globex = geofence.create_provider(new_provider("Globex")).unwrap();

        let moved = geofence
            .register(
                acme.id,
                "Moved",
                100,
                AreaGeometry::Ring(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]),
            )
            .unwrap();
        geofence
            .relocate(
                &moved.id,
                ServiceAreaPatch {
                    area: Some(AreaGeometry::Ring(vec![
                        [5.0, 5.0],
                        [6.0, 5.0],
                        [6.0, 6.0],
                        [5.0, 6.0],
                    ])),
                    ..Default::default()
                },
            )
            .unwrap();

        geofence
            .register(
                globex.id,
                "Gone",
                100,
                AreaGeometry::Ring(vec![[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 6.0]]),
            )
            .unwrap();
        geofence.delete_provider(&globex.id).unwrap();
    }

    let geofence = open(&path);
    assert!(geofence.locate(0.5, 0.5).unwrap().is_empty());

    let hits = geofence.locate(5.5, 5.5).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Moved");
    assert_eq!(geofence.stats().unwrap().store.providers, 1);
}

#[test]
fn test_empty_snapshot_file_opens() {
    let temp = NamedTempFile::new().unwrap();
    let geofence = open(temp.path());
    assert_eq!(geofence.stats().unwrap().index.areas, 0);
    assert_eq!(geofence.list_providers(1, None).unwrap().count, 0);
}
