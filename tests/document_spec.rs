use beamline::doc::Document;
use beamline::models::*;
use beamline::GroupRegistry;
use speculate2::speculate;

speculate! {
    describe "file-backed documents" {
        it "persist registry entries across reopen" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("model").join("frame.bldoc");

            let mother = {
                let doc = Document::open(path.clone()).expect("Failed to open document");
                doc.migrate().expect("Failed to run migrations");
                doc.transact(|session| {
                    let registry = GroupRegistry::new(session, "BEAM_LINES");
                    let mother = session.create_member()?;
                    let child = session.create_member()?;
                    registry.register(&GroupRecord::new(
                        mother.clone(),
                        vec![child],
                        "BL-1",
                        "beamline:1",
                        Classification::default(),
                    ))?;
                    Ok(mother)
                }).expect("Failed to register")
            };

            let doc = Document::open(path).expect("Failed to reopen document");
            doc.migrate().expect("Failed to re-run migrations");
            doc.transact(|session| {
                let registry = GroupRegistry::new(session, "BEAM_LINES");
                let found = registry.lookup_by_mother(&mother)?.expect("persisted");
                assert_eq!(found.display_name, "BL-1");
                assert_eq!(found.children.len(), 1);
                Ok(())
            }).expect("Failed to read back");
        }
    }

    describe "member markers" {
        it "survive only while the member is alive" {
            let doc = Document::open_memory().expect("Failed to create in-memory document");
            doc.migrate().expect("Failed to run migrations");

            doc.transact(|session| {
                use beamline::host::EntityResolver;

                let id = session.create_member()?;
                assert!(session.marker(&id)?.is_none());

                assert!(session.set_marker(&id, "beamline:1", Some(4))?);
                assert_eq!(
                    session.marker(&id)?,
                    Some(GroupMarker { label: "beamline:1".to_string(), ordinal: Some(4) })
                );

                assert!(session.clear_marker(&id)?);
                assert!(session.marker(&id)?.is_none());

                assert!(session.set_marker(&id, "beamline:1", None)?);
                session.erase_member(&id)?;
                assert!(!session.is_alive(&id)?);
                assert!(session.marker(&id)?.is_none());
                assert!(!session.set_marker(&id, "beamline:2", Some(0))?);
                Ok(())
            }).unwrap();
        }
    }
}
