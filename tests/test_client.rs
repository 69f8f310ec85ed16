//! Client operation surface: paste/folder lifecycle, slugs, auth,
//! offline creation and the reconnect flow.

use std::sync::Arc;
use std::time::Duration;

use notopia::{
    InMemoryRemote, MemoryKeyValueStore, NewPaste, NotopiaClient, NotopiaError, PasteFilter,
    PasteUpdate, RemoteStore, Session, SLUG_LEN,
};

fn session(uid: &str) -> Session {
    Session {
        uid: uid.to_string(),
        email: format!("{}@example.com", uid),
    }
}

fn client(online: bool) -> (Arc<InMemoryRemote>, NotopiaClient) {
    let remote = InMemoryRemote::new();
    let client = NotopiaClient::new(
        remote.clone(),
        Arc::new(MemoryKeyValueStore::new()),
        online,
    );
    client.set_session(Some(session("user-1")));
    (remote, client)
}

fn draft(title: &str) -> NewPaste {
    NewPaste {
        title: title.to_string(),
        content: format!("content of {}", title),
        tags: vec![],
        folder_id: None,
    }
}

#[tokio::test]
async fn online_create_assigns_slug_and_stamps_owner() {
    let (remote, client) = client(true);

    let paste = client.create_paste(draft("hello")).await.unwrap();

    let id = paste.id.expect("online create returns a remote id");
    let slug = paste.slug.expect("slug assigned at creation");
    assert_eq!(slug.len(), SLUG_LEN);

    let stored = remote.get_paste(&id).await.unwrap().unwrap();
    assert_eq!(stored.user_id.as_deref(), Some("user-1"));
    assert_eq!(stored.slug.as_deref(), Some(slug.as_str()));
}

#[tokio::test]
async fn create_rejects_empty_title_or_content() {
    let (_remote, client) = client(true);

    let err = client
        .create_paste(NewPaste {
            title: "  ".to_string(),
            content: "x".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, NotopiaError::InvalidPaste { .. }));

    let err = client
        .create_paste(NewPaste {
            title: "x".to_string(),
            content: "".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, NotopiaError::InvalidPaste { .. }));
}

#[tokio::test]
async fn slug_is_stable_across_edits_and_pins() {
    let (remote, client) = client(true);
    let paste = client.create_paste(draft("stable")).await.unwrap();
    let id = paste.id.unwrap();
    let slug = paste.slug.unwrap();

    for round in 0..3 {
        client
            .update_paste(
                &id,
                PasteUpdate {
                    content: Some(format!("revision {}", round)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        client.toggle_pin(&id).await.unwrap();
    }

    let stored = remote.get_paste(&id).await.unwrap().unwrap();
    assert_eq!(stored.slug.as_deref(), Some(slug.as_str()));
    assert_eq!(stored.content, "revision 2");
}

#[tokio::test]
async fn update_refreshes_updated_at_but_not_created_at() {
    let (remote, client) = client(true);
    let paste = client.create_paste(draft("timestamps")).await.unwrap();
    let id = paste.id.unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;
    client
        .update_paste(
            &id,
            PasteUpdate {
                content: Some("new content".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let stored = remote.get_paste(&id).await.unwrap().unwrap();
    assert_eq!(stored.created_at, paste.created_at);
    assert!(stored.updated_at > paste.updated_at);
}

#[tokio::test]
async fn foreign_paste_is_rejected_without_leaking_content() {
    let (_remote, client) = client(true);
    let paste = client.create_paste(draft("secret")).await.unwrap();
    let id = paste.id.unwrap();

    client.set_session(Some(session("intruder")));

    let err = client
        .update_paste(
            &id,
            PasteUpdate {
                content: Some("defaced".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, NotopiaError::Unauthorized { .. }));
    assert!(!err.to_string().contains("secret"));

    let err = client.delete_paste(&id).await.unwrap_err();
    assert!(matches!(err, NotopiaError::Unauthorized { .. }));
}

#[tokio::test]
async fn view_by_slug_is_public_and_distinguishes_not_found() {
    let (_remote, client) = client(true);
    let paste = client.create_paste(draft("shared")).await.unwrap();
    let slug = paste.slug.unwrap();

    // The slug view requires no session at all.
    client.set_session(None);

    let viewed = client.view_by_slug(&slug).await.unwrap();
    assert_eq!(viewed.title, "shared");

    let err = client.view_by_slug("no-such-slug").await.unwrap_err();
    assert!(matches!(err, NotopiaError::PasteNotFound { .. }));
}

#[tokio::test]
async fn online_create_without_session_is_rejected() {
    let (_remote, client) = client(true);
    client.set_session(None);

    let err = client.create_paste(draft("x")).await.unwrap_err();
    assert!(matches!(err, NotopiaError::NotSignedIn));
}

#[tokio::test]
async fn offline_create_buffers_without_a_session() {
    let (remote, client) = client(false);
    client.set_session(None);

    let paste = client.create_paste(draft("offline draft")).await.unwrap();

    assert!(paste.id.is_none());
    assert_eq!(paste.slug.as_ref().unwrap().len(), SLUG_LEN);
    assert_eq!(remote.paste_count(), 0);
    assert!(client.offline_buffer().is_pending().unwrap());
}

#[tokio::test]
async fn second_offline_create_replaces_the_first() {
    let (_remote, client) = client(false);

    client.create_paste(draft("first")).await.unwrap();
    client.create_paste(draft("second")).await.unwrap();

    let pending = client.offline_buffer().load().unwrap().unwrap();
    assert_eq!(pending.title, "second");
}

#[tokio::test(flavor = "multi_thread")]
async fn reconnect_flushes_the_offline_draft() {
    let (remote, client) = client(false);

    let draft = client
        .create_paste(NewPaste {
            title: "x".to_string(),
            content: "y".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let slug = draft.slug.clone().unwrap();

    let _watch = client.spawn_auto_sync();
    client.monitor().set_online(true);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(remote.paste_count(), 1);
    assert!(!client.offline_buffer().is_pending().unwrap());

    let synced = remote.find_paste_by_slug(&slug).await.unwrap().unwrap();
    assert_eq!(synced.user_id.as_deref(), Some("user-1"));
    assert_eq!(synced.title, "x");
    assert_eq!(synced.content, "y");
}

#[tokio::test]
async fn folder_lifecycle_and_no_cascade_on_delete() {
    let (remote, client) = client(true);

    let folder = client.create_folder("ideas").await.unwrap();
    let folder_id = folder.id.clone().unwrap();

    let paste = client
        .create_paste(NewPaste {
            title: "filed".to_string(),
            content: "c".to_string(),
            folder_id: Some(folder_id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();

    client.rename_folder(&folder_id, "better ideas").await.unwrap();
    let folders = client.list_folders().await.unwrap();
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].name, "better ideas");

    client.delete_folder(&folder_id).await.unwrap();
    assert!(client.list_folders().await.unwrap().is_empty());

    // No cascade: the paste keeps its dangling folder reference.
    let stored = remote.get_paste(paste.id.as_ref().unwrap()).await.unwrap().unwrap();
    assert_eq!(stored.folder_id.as_deref(), Some(folder_id.as_str()));

    // Filtering by the removed folder still finds it; by construction the
    // folder list just no longer offers that ID.
    let filter = PasteFilter {
        folder_id: Some(folder_id),
        ..Default::default()
    };
    assert_eq!(client.list_pastes(&filter).await.unwrap().len(), 1);
}

#[tokio::test]
async fn empty_folder_name_is_rejected() {
    let (_remote, client) = client(true);
    let err = client.create_folder("   ").await.unwrap_err();
    assert!(matches!(err, NotopiaError::InvalidFolder { .. }));
}

#[tokio::test]
async fn listing_filters_by_tag_and_sorts_pinned_first() {
    let (_remote, client) = client(true);

    let a = client
        .create_paste(NewPaste {
            title: "a".to_string(),
            content: "c".to_string(),
            tags: vec!["work".to_string()],
            ..Default::default()
        })
        .await
        .unwrap();
    client
        .create_paste(NewPaste {
            title: "b".to_string(),
            content: "c".to_string(),
            tags: vec!["home".to_string()],
            ..Default::default()
        })
        .await
        .unwrap();

    client.toggle_pin(a.id.as_ref().unwrap()).await.unwrap();

    let all = client.list_pastes(&PasteFilter::default()).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].title, "a"); // pinned first

    let filter = PasteFilter {
        tags: vec!["home".to_string()],
        ..Default::default()
    };
    let tagged = client.list_pastes(&filter).await.unwrap();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].title, "b");
}

#[tokio::test]
async fn search_ranks_title_hits_above_content_hits() {
    let (_remote, client) = client(true);

    client
        .create_paste(NewPaste {
            title: "rust notes".to_string(),
            content: "misc".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    client
        .create_paste(NewPaste {
            title: "journal".to_string(),
            content: "learning rust slowly".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let hits = client.search_pastes("rust", 10).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].title, "rust notes");

    let limited = client.search_pastes("rust", 1).await.unwrap();
    assert_eq!(limited.len(), 1);
}
