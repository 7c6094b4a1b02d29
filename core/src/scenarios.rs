//! End-to-end scenario tests against the in-memory fake store: two people
//! in a shard, edge creation/navigation, cascade removal, partial update,
//! rollback on error, and the do-not-commit sentinel.

use crate::id::Id;
use crate::node::Node;
use crate::store::CommitMessage;
use crate::testutil::MemStore;
use crate::transaction::run;
use crate::value::{PropMap, PropValue};
use crate::GraphError;

fn float(v: f64) -> PropValue {
    PropValue::Float(v)
}

fn text(v: &str) -> PropValue {
    PropValue::Str(v.to_string())
}

// `run` returns `Result<(), GraphError>`, so scenarios needing ids captured
// from inside the action stash them through a `Cell` rather than the return
// value — matches how `transaction.rs`'s own tests recover state.
fn run_capturing<S, T, F>(store: &mut S, msg: &CommitMessage, action: F) -> Result<T, GraphError>
where
    S: crate::store::Store,
    F: FnOnce(&mut crate::transaction::Transaction<'_, S>, &std::cell::RefCell<Option<T>>) -> Result<(), GraphError>,
{
    let captured: std::cell::RefCell<Option<T>> = std::cell::RefCell::new(None);
    run(store, msg, |txn| action(txn, &captured))?;
    Ok(captured.into_inner().expect("scenario action did not capture a result"))
}

#[test]
fn two_persons_in_one_shard_scenario() {
    let mut store = MemStore::new("s1");
    let (a_id, b_id) = run_capturing(&mut store, &CommitMessage::default(), |txn, out| {
        let mut a = Node::new_in("s1")?;
        a.set_property("FirstName", text("Nadja"))?;
        a.set_property("Age", float(44.0))?;
        a.save(txn)?;

        let mut b = Node::new_in("s1")?;
        b.set_property("FirstName", text("Benny"))?;
        b.set_property("Age", float(42.0))?;
        b.save(txn)?;

        *out.borrow_mut() = Some((a.id().clone(), b.id().clone()));
        Ok(())
    })
    .unwrap();

    run(&mut store, &CommitMessage::default(), |txn| {
        let mut a = Node::open(a_id.clone());
        a.load_properties(txn, &["FirstName".to_string(), "Age".to_string()])?;
        assert_eq!(a.property::<String>("FirstName").unwrap(), Some("Nadja".to_string()));
        assert_eq!(a.property::<f64>("Age").unwrap(), Some(44.0));

        let mut b = Node::open(b_id.clone());
        b.load_properties(txn, &["FirstName".to_string(), "Age".to_string()])?;
        assert_eq!(b.property::<String>("FirstName").unwrap(), Some("Benny".to_string()));
        assert_eq!(b.property::<f64>("Age").unwrap(), Some(42.0));
        Ok(())
    })
    .unwrap();
}

#[test]
fn edge_creation_and_navigation() {
    let mut store = MemStore::new("s1");
    let (a_id, b_id) = run_capturing(&mut store, &CommitMessage::default(), |txn, out| {
        let mut a = Node::new_in("s1")?;
        a.set_property("Name", text("A"))?;
        a.save(txn)?;

        let mut b = Node::new_in("s1")?;
        b.set_property("Name", text("B"))?;
        b.save(txn)?;

        a.new_edge(txn, "points-to", b.id(), PropMap::new())?;
        *out.borrow_mut() = Some((a.id().clone(), b.id().clone()));
        Ok(())
    })
    .unwrap();

    run(&mut store, &CommitMessage::default(), |txn| {
        let a = Node::open(a_id.clone());
        let edges = a.get_edges(txn, "points-to", "s1")?;
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].to, b_id);
        Ok(())
    })
    .unwrap();
}

#[test]
fn edge_cascade_removal() {
    let mut store = MemStore::new("s1");
    let a_id = run_capturing(&mut store, &CommitMessage::default(), |txn, out| {
        let a = Node::new_in("s1")?;
        let b = Node::new_in("s1")?;

        let mut props = PropMap::new();
        props.insert("weight".into(), float(3.0));
        let edge = a.new_edge(txn, "points-to", b.id(), props)?;
        let prop_node_id = edge.properties.clone().unwrap();

        txn.remove_edges("points-to", a.id())?;

        let loaded = txn.get_node_properties(&prop_node_id, &["weight".to_string()])?;
        assert!(loaded.is_empty());

        *out.borrow_mut() = Some(a.id().clone());
        Ok(())
    })
    .unwrap();
    let _ = a_id;
}

#[test]
fn partial_update_merges() {
    let mut store = MemStore::new("s1");
    let a_id = run_capturing(&mut store, &CommitMessage::default(), |txn, out| {
        let mut a = Node::new_in("s1")?;
        a.set_property("a", float(1.0))?;
        a.set_property("b", float(2.0))?;
        a.save(txn)?;
        *out.borrow_mut() = Some(a.id().clone());
        Ok(())
    })
    .unwrap();

    run(&mut store, &CommitMessage::default(), |txn| {
        let mut a = Node::open(a_id.clone());
        a.set_property("b", float(3.0))?;
        a.set_property("c", float(4.0))?;
        a.save(txn)?;
        Ok(())
    })
    .unwrap();

    run(&mut store, &CommitMessage::default(), |txn| {
        let mut a = Node::open(a_id.clone());
        a.load_properties(txn, &["a".to_string(), "b".to_string(), "c".to_string()])?;
        assert_eq!(a.property::<f64>("a").unwrap(), Some(1.0));
        assert_eq!(a.property::<f64>("b").unwrap(), Some(3.0));
        assert_eq!(a.property::<f64>("c").unwrap(), Some(4.0));
        Ok(())
    })
    .unwrap();
}

#[test]
fn partial_update_deletes_only_the_removed_key() {
    let mut store = MemStore::new("s1");
    let a_id = run_capturing(&mut store, &CommitMessage::default(), |txn, out| {
        let mut a = Node::new_in("s1")?;
        a.set_property("a", float(1.0))?;
        a.set_property("b", float(2.0))?;
        a.save(txn)?;
        *out.borrow_mut() = Some(a.id().clone());
        Ok(())
    })
    .unwrap();

    run(&mut store, &CommitMessage::default(), |txn| {
        let mut a = Node::open(a_id.clone());
        a.remove_property("b");
        a.save(txn)?;
        Ok(())
    })
    .unwrap();

    run(&mut store, &CommitMessage::default(), |txn| {
        let mut a = Node::open(a_id.clone());
        a.load_properties(txn, &["a".to_string(), "b".to_string()])?;
        assert_eq!(a.property::<f64>("a").unwrap(), Some(1.0));
        assert!(a.property::<f64>("b").unwrap().is_none());
        Ok(())
    })
    .unwrap();
}

#[test]
fn rollback_on_error_leaves_nothing_observable() {
    let mut store = MemStore::new("s1");
    let a_id = Id::new_in("s1").unwrap();

    let result = run(&mut store, &CommitMessage::default(), |txn| {
        let mut a = Node::open(a_id.clone());
        a.set_property("x", float(1.0))?;
        a.save(txn)?;
        Err(GraphError::Validation("induced failure".into()))
    });
    assert!(result.is_err());

    run(&mut store, &CommitMessage::default(), |txn| {
        let mut a = Node::open(a_id.clone());
        a.load_properties(txn, &["x".to_string()])?;
        assert!(a.property::<f64>("x").unwrap().is_none());
        Ok(())
    })
    .unwrap();
}

#[test]
fn do_not_commit_sentinel_reports_success_with_nothing_stored() {
    let mut store = MemStore::new("s1");
    let a_id = Id::new_in("s1").unwrap();

    let result = run(&mut store, &CommitMessage::default(), |txn| {
        let mut a = Node::open(a_id.clone());
        a.set_property("x", float(1.0))?;
        a.save(txn)?;
        Err(GraphError::DoNotCommit)
    });
    assert!(result.is_ok());

    run(&mut store, &CommitMessage::default(), |txn| {
        let mut a = Node::open(a_id.clone());
        a.load_properties(txn, &["x".to_string()])?;
        assert!(a.property::<f64>("x").unwrap().is_none());
        Ok(())
    })
    .unwrap();
}

#[test]
fn dangling_edge_target_still_reported_after_target_removed() {
    let mut store = MemStore::new("s1");
    let (a_id, b_id) = run_capturing(&mut store, &CommitMessage::default(), |txn, out| {
        let a = Node::new_in("s1")?;
        let b = Node::new_in("s1")?;
        a.new_edge(txn, "points-to", b.id(), PropMap::new())?;
        *out.borrow_mut() = Some((a.id().clone(), b.id().clone()));
        Ok(())
    })
    .unwrap();

    run(&mut store, &CommitMessage::default(), |txn| {
        let b = Node::open(b_id.clone());
        b.remove(txn)
    })
    .unwrap();

    run(&mut store, &CommitMessage::default(), |txn| {
        let a = Node::open(a_id.clone());
        let edges = a.get_edges(txn, "points-to", "s1")?;
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].to, b_id);
        Ok(())
    })
    .unwrap();
}
