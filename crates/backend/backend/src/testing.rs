use chrono::{DateTime, Duration, Utc};

use ndadesk_core::{Identity, NdaId, NdaPatch, NdaStatus, NewNda, Session};

use crate::backend::NdaBackend;
use crate::error::BackendError;

/// Run the full backend conformance test suite.
///
/// `session` must be a live session for `identity`. The suite signs that
/// session out as its final step, so pass a session nothing else relies on.
///
/// # Errors
///
/// Returns an error if any backend call fails unexpectedly.
pub async fn run_backend_conformance_tests(
    backend: &dyn NdaBackend,
    session: &Session,
    identity: &Identity,
) -> Result<(), BackendError> {
    test_current_identity(backend, session, identity).await?;
    test_unknown_session(backend).await?;
    test_insert_defaults(backend, session, identity).await?;
    test_list_order(backend, session, identity).await?;
    test_reminder_update(backend, session, identity).await?;
    test_lock_toggle(backend, session, identity).await?;
    test_locked_refuses_reminder(backend, session, identity).await?;
    test_update_missing(backend, session).await?;
    test_sign_out(backend, session).await?;
    Ok(())
}

fn draft(identity: &Identity, name: &str, sent: DateTime<Utc>) -> NewNda {
    let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
    NewNda::draft(name, email, identity.id.clone(), sent)
}

async fn test_current_identity(
    backend: &dyn NdaBackend,
    session: &Session,
    identity: &Identity,
) -> Result<(), BackendError> {
    let current = backend.current_identity(session).await?;
    assert_eq!(
        current.map(|i| i.id),
        Some(identity.id.clone()),
        "live session should resolve to its identity"
    );
    Ok(())
}

async fn test_unknown_session(backend: &dyn NdaBackend) -> Result<(), BackendError> {
    let current = backend
        .current_identity(&Session::new("not-a-real-token"))
        .await?;
    assert!(current.is_none(), "unknown token should have no identity");
    Ok(())
}

async fn test_insert_defaults(
    backend: &dyn NdaBackend,
    session: &Session,
    identity: &Identity,
) -> Result<(), BackendError> {
    let new = draft(identity, "Conformance Insert", Utc::now());
    let stored = backend.insert_nda(session, &new).await?;

    assert!(!stored.id.is_empty(), "backend must assign an id");
    assert_eq!(stored.customer_name, new.customer_name);
    assert_eq!(stored.customer_email, new.customer_email);
    assert_eq!(stored.status, NdaStatus::Sent);
    assert!(!stored.locked);
    assert!(stored.reminder_sent.is_none());
    assert_eq!(stored.created_by, identity.id);

    let listed = backend.list_ndas(session).await?;
    let matching = listed.iter().filter(|n| n.id == stored.id).count();
    assert_eq!(matching, 1, "inserted record should be listed exactly once");
    Ok(())
}

async fn test_list_order(
    backend: &dyn NdaBackend,
    session: &Session,
    identity: &Identity,
) -> Result<(), BackendError> {
    let base = Utc::now() - Duration::days(30);
    for (name, offset) in [("Order Middle", 2), ("Order Oldest", 1), ("Order Newest", 3)] {
        backend
            .insert_nda(session, &draft(identity, name, base + Duration::days(offset)))
            .await?;
    }

    let listed = backend.list_ndas(session).await?;
    assert!(
        listed
            .windows(2)
            .all(|pair| pair[0].sent_date >= pair[1].sent_date),
        "list should be ordered by sent_date descending"
    );
    Ok(())
}

async fn test_reminder_update(
    backend: &dyn NdaBackend,
    session: &Session,
    identity: &Identity,
) -> Result<(), BackendError> {
    let stored = backend
        .insert_nda(session, &draft(identity, "Reminder Target", Utc::now()))
        .await?;

    let first_at = Utc::now();
    let first = backend
        .update_nda(session, &stored.id, &NdaPatch::reminder(first_at))
        .await?;
    assert_eq!(first.reminder_sent, Some(first_at));

    let second_at = first_at + Duration::seconds(5);
    let second = backend
        .update_nda(session, &stored.id, &NdaPatch::reminder(second_at))
        .await?;
    assert_eq!(second.reminder_sent, Some(second_at));
    assert_eq!(second.sent_date, stored.sent_date, "sent_date is immutable");
    assert_eq!(second.created_by, stored.created_by);
    Ok(())
}

async fn test_lock_toggle(
    backend: &dyn NdaBackend,
    session: &Session,
    identity: &Identity,
) -> Result<(), BackendError> {
    let stored = backend
        .insert_nda(session, &draft(identity, "Lock Target", Utc::now()))
        .await?;

    let locked = backend
        .update_nda(session, &stored.id, &NdaPatch::lock(!stored.locked))
        .await?;
    assert!(locked.locked);

    let unlocked = backend
        .update_nda(session, &stored.id, &NdaPatch::lock(!locked.locked))
        .await?;
    assert_eq!(unlocked.locked, stored.locked, "toggling twice is a no-op");
    Ok(())
}

async fn test_locked_refuses_reminder(
    backend: &dyn NdaBackend,
    session: &Session,
    identity: &Identity,
) -> Result<(), BackendError> {
    let stored = backend
        .insert_nda(session, &draft(identity, "Locked Target", Utc::now()))
        .await?;
    backend
        .update_nda(session, &stored.id, &NdaPatch::lock(true))
        .await?;

    let result = backend
        .update_nda(session, &stored.id, &NdaPatch::reminder(Utc::now()))
        .await;
    assert!(
        matches!(result, Err(BackendError::Locked(_))),
        "reminder on a locked record should be Locked, got {result:?}"
    );

    let listed = backend.list_ndas(session).await?;
    let row = listed.iter().find(|n| n.id == stored.id);
    assert!(
        row.is_some_and(|n| n.locked && n.reminder_sent.is_none()),
        "refused reminder must leave the record untouched"
    );

    // A missing record stays NotFound even with the lock filter.
    let result = backend
        .update_nda(session, &NdaId::new("does-not-exist"), &NdaPatch::reminder(Utc::now()))
        .await;
    assert!(
        matches!(result, Err(BackendError::NotFound(_))),
        "reminder on a missing record should be NotFound, got {result:?}"
    );
    Ok(())
}

async fn test_update_missing(
    backend: &dyn NdaBackend,
    session: &Session,
) -> Result<(), BackendError> {
    let result = backend
        .update_nda(session, &NdaId::new("does-not-exist"), &NdaPatch::lock(true))
        .await;
    assert!(
        matches!(result, Err(BackendError::NotFound(_))),
        "update of a missing record should be NotFound, got {result:?}"
    );
    Ok(())
}

async fn test_sign_out(backend: &dyn NdaBackend, session: &Session) -> Result<(), BackendError> {
    backend.sign_out(session).await?;
    let current = backend.current_identity(session).await?;
    assert!(current.is_none(), "signed-out session should have no identity");
    Ok(())
}
