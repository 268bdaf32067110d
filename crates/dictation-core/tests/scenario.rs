//! End-to-end dictation flow against an on-disk store

use dictation_core::{
    Config, NewSession, NewWord, SessionQuery, SessionStatus, SessionWord, Store, WordStatus,
};
use tempfile::TempDir;

#[tokio::test]
async fn test_dictation_round() {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::open_with_config(Config::with_data_dir(temp_dir.path()))
        .await
        .unwrap();

    let id = store
        .insert_word(NewWord::new("霜", "shuāng", "G1/U1/L1"))
        .await
        .unwrap();
    assert_eq!(id, 1);

    let words = store.query_words_by_path_prefix("G1/U1").await.unwrap();
    assert_eq!(words.len(), 1);
    assert_eq!(words[0].id, 1);
    assert_eq!(words[0].content, "霜");

    let session_words = vec![SessionWord {
        word_id: 1,
        content: "霜".to_string(),
        pinyin: "shuāng".to_string(),
        status: WordStatus::New,
    }];
    let session_id = store
        .create_session(NewSession::new("Lesson 1", "G1/U1", session_words))
        .await
        .unwrap();

    let session = store.get_session(session_id).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Pending);
    assert!(session.completed_at.is_none());

    store
        .update_session_word_status(session_id, 1, WordStatus::Correct)
        .await
        .unwrap();
    store.complete_session(session_id).await.unwrap();

    let session = store.get_session(session_id).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert!(session.completed_at.is_some());
    assert_eq!(session.words[0].status, WordStatus::Correct);

    let completed = store
        .list_sessions(SessionQuery::with_status(SessionStatus::Completed))
        .await
        .unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, session_id);
}

#[tokio::test]
async fn test_retest_session_from_history() {
    let store = Store::open_in_memory().unwrap();
    store
        .import_words(vec![
            NewWord::new("一", "yī", "G1/U1"),
            NewWord::new("二", "èr", "G1/U1"),
            NewWord::new("三", "sān", "G1/U2"),
        ])
        .await
        .unwrap();

    let words = store.query_words_by_path_prefix("G1").await.unwrap();
    let snapshot = words.iter().map(SessionWord::snapshot).collect();
    let first = store
        .create_session(NewSession::new("Round 1", "G1", snapshot))
        .await
        .unwrap();

    store
        .update_session_word_status(first, 1, WordStatus::Correct)
        .await
        .unwrap();
    store
        .update_session_word_status(first, 2, WordStatus::WrongPinyin)
        .await
        .unwrap();
    store
        .update_session_word_status(first, 3, WordStatus::WrongPinyin)
        .await
        .unwrap();
    store.complete_session(first).await.unwrap();

    // Library changes after the session do not touch its history
    store.delete_word(2).await.unwrap();

    let source = store.get_session(first).await.unwrap().unwrap();
    let retest = source.words_with_status(&[WordStatus::WrongPinyin]);
    assert_eq!(retest.len(), 2);
    assert_eq!(retest[0].content, "二");

    let second = store
        .create_session(
            NewSession::new("Round 2", source.filter_path.clone(), retest)
                .with_note("wrong pinyin only"),
        )
        .await
        .unwrap();

    let sessions = store.list_sessions(SessionQuery::default()).await.unwrap();
    let ids: Vec<i64> = sessions.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![second, first]);
    assert_eq!(sessions[0].status, SessionStatus::Pending);
    assert_eq!(sessions[0].word_count(), 2);
}
