//! Unit tests for the summarizer: context building, reply normalization,
//! and quota-driven key rotation.

#[cfg(test)]
mod summarizer_tests {
    use crate::agents::NewscasterAgent;
    use crate::error::LlmError;
    use crate::llm::{ChatBackend, CredentialPool};
    use crate::news::NewsResult;
    use crate::services::summarizer::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Backend replaying scripted responses and recording the key of each call
    struct ScriptedBackend {
        script: Mutex<VecDeque<Result<String, LlmError>>>,
        keys_used: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Result<String, LlmError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                keys_used: Mutex::new(Vec::new()),
            })
        }

        fn keys_used(&self) -> Vec<String> {
            self.keys_used.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn chat(&self, api_key: &str, _system: &str, _user: &str) -> Result<String, LlmError> {
            self.keys_used.lock().unwrap().push(api_key.to_string());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::Api("script exhausted".into())))
        }
    }

    fn quota() -> Result<String, LlmError> {
        Err(LlmError::QuotaExhausted("429".into()))
    }

    fn pool(keys: &[&str]) -> CredentialPool {
        CredentialPool::new(keys.iter().map(|k| k.to_string()).collect()).unwrap()
    }

    fn summarizer(backend: Arc<ScriptedBackend>, keys: &[&str]) -> Summarizer {
        Summarizer::new(backend, pool(keys), NewscasterAgent::default())
    }

    fn one_result() -> Vec<NewsResult> {
        vec![NewsResult::new("x.com", "USD/JPY rose 1% five minutes ago")]
    }

    // ============= Context Tests =============

    #[test]
    fn test_context_format() {
        let results = vec![NewsResult::new("a.com", "one"), NewsResult::new("b.com", "")];
        assert_eq!(build_context(&results), "URL: a.com\n本文: one\n---\nURL: b.com\n本文: \n---\n");
    }

    #[test]
    fn test_context_capped_by_characters() {
        let results = vec![NewsResult::new("x.com", "円".repeat(30_000))];
        let context = build_context(&results);

        assert_eq!(context.chars().count(), 20_000);
        assert!(context.starts_with("URL: x.com\n本文: 円"));
    }

    // ============= Reply Normalization Tests =============

    #[test]
    fn test_sentinel_anywhere_is_no_news() {
        for raw in ["NO_NEWS", "  NO_NEWS\n", "```json\n\"NO_NEWS\"\n```", "残念、NO_NEWS だ！", r#"{"type":"chat","text":"NO_NEWS"}"#] {
            assert_eq!(normalize_reply(raw), None, "{raw:?} should be treated as no news");
        }
    }

    #[test]
    fn test_reply_fence_removed() {
        let raw = "```json\n{\"type\":\"chat\",\"text\":\"ドル円上がったぞ！\"}\n```";
        assert_eq!(
            normalize_reply(raw).as_deref(),
            Some("{\"type\":\"chat\",\"text\":\"ドル円上がったぞ！\"}")
        );
    }

    #[test]
    fn test_blank_reply_is_no_news() {
        for raw in ["", "  \n", "```json\n```", "```\n\n```"] {
            assert_eq!(normalize_reply(raw), None, "{raw:?} should be treated as no news");
        }
    }

    // ============= Retry / Rotation Tests =============

    #[tokio::test]
    async fn test_happy_path_single_call() {
        let backend = ScriptedBackend::new(vec![Ok(r#"{"type":"chat","text":"ドル円上がったぞ！"}"#.into())]);
        let mut s = summarizer(backend.clone(), &["k0", "k1"]);

        let outcome = s.summarize(&one_result()).await;

        assert_eq!(outcome, SummaryOutcome::Reply(r#"{"type":"chat","text":"ドル円上がったぞ！"}"#.into()));
        assert_eq!(backend.keys_used(), vec!["k0"]);
        assert_eq!(s.credentials().cursor(), 0);
    }

    #[tokio::test]
    async fn test_empty_results_skip_backend() {
        let backend = ScriptedBackend::new(vec![]);
        let mut s = summarizer(backend.clone(), &["k0"]);

        assert_eq!(s.summarize(&[]).await, SummaryOutcome::NothingQualified);
        assert!(backend.keys_used().is_empty());
    }

    #[tokio::test]
    async fn test_quota_exhaustion_with_two_keys() {
        let backend = ScriptedBackend::new(vec![quota(), quota(), quota()]);
        let mut s = summarizer(backend.clone(), &["k0", "k1"]);

        let outcome = s.summarize(&one_result()).await;

        assert_eq!(outcome, SummaryOutcome::QuotaExhausted);
        assert_eq!(outcome.into_reply(), None);
        // three attempts, two rotations: k0 -> k1 -> k0
        assert_eq!(backend.keys_used(), vec!["k0", "k1", "k0"]);
        assert_eq!(s.credentials().cursor(), 0);
    }

    #[tokio::test]
    async fn test_quota_then_success_on_next_key() {
        let backend = ScriptedBackend::new(vec![quota(), Ok("ユーロ高だ！".into())]);
        let mut s = summarizer(backend.clone(), &["k0", "k1", "k2"]);

        let outcome = s.summarize(&one_result()).await;

        assert_eq!(outcome, SummaryOutcome::Reply("ユーロ高だ！".into()));
        assert_eq!(backend.keys_used(), vec!["k0", "k1"]);
        assert_eq!(s.credentials().cursor(), 1);
    }

    #[tokio::test]
    async fn test_other_error_not_retried() {
        let backend = ScriptedBackend::new(vec![Err(LlmError::Api("bad request".into())), Ok("unused".into())]);
        let mut s = summarizer(backend.clone(), &["k0", "k1"]);

        assert_eq!(s.summarize(&one_result()).await, SummaryOutcome::Failed);
        assert_eq!(backend.keys_used(), vec!["k0"]);
        assert_eq!(s.credentials().cursor(), 0);
    }

    #[tokio::test]
    async fn test_cursor_persists_across_cycles() {
        let backend = ScriptedBackend::new(vec![quota(), Ok("first".into()), Ok("second".into())]);
        let mut s = summarizer(backend.clone(), &["k0", "k1", "k2"]);

        s.summarize(&one_result()).await;
        s.summarize(&one_result()).await;

        // second cycle starts where the first left off
        assert_eq!(backend.keys_used(), vec!["k0", "k1", "k1"]);
    }

    #[tokio::test]
    async fn test_sentinel_reply_is_nothing_qualified() {
        let backend = ScriptedBackend::new(vec![Ok("NO_NEWS".into())]);
        let mut s = summarizer(backend, &["k0"]);

        assert_eq!(s.summarize(&one_result()).await, SummaryOutcome::NothingQualified);
    }

    #[tokio::test]
    async fn test_empty_reply_is_nothing_qualified() {
        let backend = ScriptedBackend::new(vec![Ok(String::new())]);
        let mut s = summarizer(backend, &["k0"]);

        assert_eq!(s.summarize(&one_result()).await, SummaryOutcome::NothingQualified);
    }

    #[tokio::test]
    async fn test_fence_only_reply_is_nothing_qualified() {
        let backend = ScriptedBackend::new(vec![Ok("```json\n```".into())]);
        let mut s = summarizer(backend, &["k0"]);

        assert_eq!(s.summarize(&one_result()).await, SummaryOutcome::NothingQualified);
    }
}
