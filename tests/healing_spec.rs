use beamline::doc::{DocSession, Document};
use beamline::models::*;
use beamline::GroupRegistry;
use speculate2::speculate;

const CATEGORY: &str = "BEAM_LINES";

fn create_members(session: &DocSession, count: usize) -> Vec<EntityId> {
    (0..count)
        .map(|_| session.create_member().expect("Failed to create member"))
        .collect()
}

fn beam_record(mother: &EntityId, children: &[EntityId], name: &str, label: &str) -> GroupRecord {
    GroupRecord::new(
        mother.clone(),
        children.to_vec(),
        name,
        label,
        Classification {
            kind: "beam_line".to_string(),
            axis: "Y".to_string(),
            level: 1,
            width: 180.0,
            height: 360.0,
        },
    )
}

speculate! {
    before {
        let doc = Document::open_memory().expect("Failed to create in-memory document");
        doc.migrate().expect("Failed to run migrations");
    }

    describe "election" {
        it "promotes the first resolving child in stored order" {
            doc.transact(|session| {
                let registry = GroupRegistry::new(session, CATEGORY);
                let ids = create_members(session, 4); // M, C1, C2, C3
                registry.register(&beam_record(&ids[0], &ids[1..], "BL-1", "beamline:1"))?;

                session.erase_member(&ids[0])?; // mother gone
                session.erase_member(&ids[1])?; // C1 gone too

                let outcome = registry.elect_new_mother(&ids[0])?;
                assert_eq!(outcome, ElectionOutcome::Elected(ids[2].clone()));

                // Old key is gone, new record keeps metadata and survivor order.
                assert!(registry.lookup_by_mother(&ids[0])?.is_none());
                let healed = registry.lookup_by_mother(&ids[2])?.expect("re-keyed record");
                assert_eq!(healed.children, vec![ids[3].clone()]);
                assert_eq!(healed.display_name, "BL-1");
                assert_eq!(healed.logical_label, "beamline:1");
                Ok(())
            }).unwrap();
        }

        it "leaves a healthy group untouched" {
            doc.transact(|session| {
                let registry = GroupRegistry::new(session, CATEGORY);
                let ids = create_members(session, 2);
                registry.register(&beam_record(&ids[0], &ids[1..], "BL-1", "beamline:1"))?;

                assert_eq!(registry.elect_new_mother(&ids[0])?, ElectionOutcome::Stable);
                assert!(registry.lookup_by_mother(&ids[0])?.is_some());
                Ok(())
            }).unwrap();
        }

        it "deletes the group when no member survives" {
            doc.transact(|session| {
                let registry = GroupRegistry::new(session, CATEGORY);
                let ids = create_members(session, 3);
                registry.register(&beam_record(&ids[0], &ids[1..], "BL-1", "beamline:1"))?;

                for id in &ids {
                    session.erase_member(id)?;
                }

                assert_eq!(registry.elect_new_mother(&ids[0])?, ElectionOutcome::Deleted);
                assert!(registry.lookup_by_mother(&ids[0])?.is_none());
                assert!(registry.lookup_by_label("beamline:1")?.is_none());
                Ok(())
            }).unwrap();
        }

        it "reports NotFound for an unknown key" {
            doc.transact(|session| {
                let registry = GroupRegistry::new(session, CATEGORY);
                let outcome = registry.elect_new_mother(&EntityId::from("ghost"))?;
                assert_eq!(outcome, ElectionOutcome::NotFound);
                Ok(())
            }).unwrap();
        }

        it "converges: a second election on the healed group is stable" {
            doc.transact(|session| {
                let registry = GroupRegistry::new(session, CATEGORY);
                let ids = create_members(session, 3);
                registry.register(&beam_record(&ids[0], &ids[1..], "BL-1", "beamline:1"))?;
                session.erase_member(&ids[0])?;

                let ElectionOutcome::Elected(new_mother) = registry.elect_new_mother(&ids[0])? else {
                    panic!("expected election");
                };
                assert_eq!(registry.elect_new_mother(&new_mother)?, ElectionOutcome::Stable);
                Ok(())
            }).unwrap();
        }
    }

    describe "heal_orphans" {
        it "elects and deletes across the whole category" {
            doc.transact(|session| {
                let registry = GroupRegistry::new(session, CATEGORY);

                // Healthy group.
                let a = create_members(session, 2);
                registry.register(&beam_record(&a[0], &a[1..], "BL-a", "beamline:a"))?;

                // Orphaned group with a surviving child.
                let b = create_members(session, 2);
                registry.register(&beam_record(&b[0], &b[1..], "BL-b", "beamline:b"))?;
                session.erase_member(&b[0])?;

                // Fully dead group.
                let c = create_members(session, 2);
                registry.register(&beam_record(&c[0], &c[1..], "BL-c", "beamline:c"))?;
                session.erase_member(&c[0])?;
                session.erase_member(&c[1])?;

                let report = registry.heal_orphans()?;
                assert_eq!(report, HealReport { stable: 1, elected: 1, deleted: 1 });

                assert!(registry.lookup_by_label("beamline:a")?.is_some());
                let healed = registry.lookup_by_label("beamline:b")?.expect("healed");
                assert_eq!(healed.mother, b[1]);
                assert!(registry.lookup_by_label("beamline:c")?.is_none());

                // Idempotent: a second pass finds only stable groups.
                let again = registry.heal_orphans()?;
                assert_eq!(again, HealReport { stable: 2, elected: 0, deleted: 0 });
                Ok(())
            }).unwrap();
        }
    }

    describe "resurrection" {
        it "rebuilds membership ordered by marker ordinal" {
            doc.transact(|session| {
                let registry = GroupRegistry::new(session, CATEGORY);
                let ids = create_members(session, 3); // A, B, C
                session.set_marker(&ids[0], "beamline:9", Some(2))?;
                session.set_marker(&ids[1], "beamline:9", Some(0))?;
                session.set_marker(&ids[2], "beamline:9", Some(1))?;

                assert!(registry.resurrect("beamline:9", &ids)?);

                let rebuilt = registry.lookup_by_label("beamline:9")?.expect("rebuilt");
                assert_eq!(rebuilt.mother, ids[1]); // B: ordinal 0
                assert_eq!(rebuilt.children, vec![ids[2].clone(), ids[0].clone()]); // C, A
                assert_eq!(rebuilt.display_name, "");
                Ok(())
            }).unwrap();
        }

        it "excludes candidates that no longer resolve" {
            doc.transact(|session| {
                let registry = GroupRegistry::new(session, CATEGORY);
                let ids = create_members(session, 3);
                session.set_marker(&ids[0], "beamline:9", Some(0))?;
                session.set_marker(&ids[1], "beamline:9", Some(1))?;
                session.set_marker(&ids[2], "beamline:9", Some(2))?;
                session.erase_member(&ids[1])?; // D in the middle drops out

                assert!(registry.resurrect("beamline:9", &ids)?);

                let rebuilt = registry.lookup_by_label("beamline:9")?.expect("rebuilt");
                assert_eq!(rebuilt.mother, ids[0]);
                assert_eq!(rebuilt.children, vec![ids[2].clone()]);
                Ok(())
            }).unwrap();
        }

        it "sorts members without an ordinal last, in input order" {
            doc.transact(|session| {
                let registry = GroupRegistry::new(session, CATEGORY);
                let ids = create_members(session, 4);
                // ids[0] and ids[2] lost their markers entirely.
                session.set_marker(&ids[1], "beamline:9", Some(5))?;
                session.set_marker(&ids[3], "beamline:9", Some(1))?;

                assert!(registry.resurrect("beamline:9", &ids)?);

                let rebuilt = registry.lookup_by_label("beamline:9")?.expect("rebuilt");
                assert_eq!(rebuilt.mother, ids[3]); // lowest ordinal
                assert_eq!(
                    rebuilt.children,
                    vec![ids[1].clone(), ids[0].clone(), ids[2].clone()]
                );
                Ok(())
            }).unwrap();
        }

        it "returns false and writes nothing when no candidate resolves" {
            doc.transact(|session| {
                let registry = GroupRegistry::new(session, CATEGORY);
                let ids = create_members(session, 2);
                for id in &ids {
                    session.erase_member(id)?;
                }

                assert!(!registry.resurrect("beamline:9", &ids)?);
                assert!(registry.lookup_by_label("beamline:9")?.is_none());
                Ok(())
            }).unwrap();
        }
    }

    describe "sweep" {
        it "removes exactly the entries whose key is dead" {
            doc.transact(|session| {
                let registry = GroupRegistry::new(session, CATEGORY);

                let live = create_members(session, 2);
                registry.register(&beam_record(&live[0], &live[1..], "BL-live", "beamline:l"))?;
                let before = registry.lookup_by_mother(&live[0])?.expect("live record");

                let dead = create_members(session, 2);
                registry.register(&beam_record(&dead[0], &dead[1..], "BL-dead", "beamline:d"))?;
                session.erase_member(&dead[0])?;

                assert_eq!(registry.sweep()?, 1);

                assert!(registry.lookup_by_mother(&dead[0])?.is_none());
                let after = registry.lookup_by_mother(&live[0])?.expect("still there");
                assert_eq!(before, after);
                Ok(())
            }).unwrap();
        }

        it "leaves a live mother with stale children alone" {
            doc.transact(|session| {
                let registry = GroupRegistry::new(session, CATEGORY);
                let ids = create_members(session, 3);
                registry.register(&beam_record(&ids[0], &ids[1..], "BL-1", "beamline:1"))?;
                session.erase_member(&ids[1])?;
                session.erase_member(&ids[2])?;

                assert_eq!(registry.sweep()?, 0);
                assert!(registry.lookup_by_mother(&ids[0])?.is_some());
                Ok(())
            }).unwrap();
        }

        it "sweeps an empty or missing category without effect" {
            doc.transact(|session| {
                let registry = GroupRegistry::new(session, CATEGORY);
                assert_eq!(registry.sweep()?, 0);
                Ok(())
            }).unwrap();
        }
    }

    describe "stats" {
        it "counts groups, children, and orphans" {
            doc.transact(|session| {
                let registry = GroupRegistry::new(session, CATEGORY);

                let a = create_members(session, 3);
                registry.register(&beam_record(&a[0], &a[1..], "BL-a", "beamline:a"))?;

                let b = create_members(session, 2);
                registry.register(&beam_record(&b[0], &b[1..], "BL-b", "beamline:b"))?;
                session.erase_member(&b[0])?;

                let stats = registry.stats()?;
                assert_eq!(stats, RegistryStats {
                    group_count: 2,
                    child_count: 3,
                    orphaned_count: 1,
                });
                Ok(())
            }).unwrap();
        }

        it "is all zeroes for an untouched category" {
            doc.transact(|session| {
                let registry = GroupRegistry::new(session, CATEGORY);
                assert_eq!(registry.stats()?, RegistryStats::default());
                Ok(())
            }).unwrap();
        }
    }
}
