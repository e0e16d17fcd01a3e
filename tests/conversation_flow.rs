mod common;

use common::{ service, web_chunk, ScriptedClient };
use strategy_lab::config::prompt::PromptConfig;
use strategy_lab::history::DEFAULT_WELCOME;
use strategy_lab::llm::chat::GenerateResponse;
use strategy_lab::models::chat::{ ChatMessage, Role, Source };
use strategy_lab::session::{ ChatSession, SubmitError };

#[tokio::test]
async fn grounded_answer_lands_after_the_question() {
    let client = ScriptedClient::new();
    client.push(
        Ok(GenerateResponse {
            text: Some("DAOs are...".into()),
            grounding: vec![web_chunk("Docs", "https://x")],
        })
    );
    let mut session = ChatSession::new(service(client));

    session.submit("What is DAO governance?").await.unwrap();

    assert_eq!(
        session.conversation().messages(),
        &[
            ChatMessage::assistant(DEFAULT_WELCOME, Vec::new()),
            ChatMessage::user("What is DAO governance?"),
            ChatMessage::assistant(
                "DAOs are...",
                vec![Source { title: "Docs".into(), uri: "https://x".into() }]
            ),
        ]
    );
}

#[tokio::test]
async fn provider_failure_still_appends_an_assistant_turn() {
    let client = ScriptedClient::new();
    client.fail();
    let mut session = ChatSession::new(service(client));

    let reply = session.submit("anything at all").await.expect("failure is absorbed");

    let fallback = PromptConfig::default().error_fallback;
    assert_eq!(reply, ChatMessage::assistant(fallback.clone(), Vec::new()));
    let messages = session.conversation().messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1], ChatMessage::user("anything at all"));
    assert_eq!(messages[2].text(), fallback);
    assert!(messages[2].sources().is_none());
}

#[tokio::test]
async fn transcript_grows_by_two_per_exchange_with_alternating_roles() {
    let client = ScriptedClient::new();
    client.answer("one");
    client.fail();
    client.push(Ok(GenerateResponse::default()));
    client.push(
        Ok(GenerateResponse {
            text: Some("four".into()),
            grounding: vec![web_chunk("A", "https://a")],
        })
    );
    let mut session = ChatSession::new(service(client.clone()));

    let questions = ["q1", "q2", "q3", "q4"];
    for (n, q) in questions.iter().enumerate() {
        session.submit(q).await.unwrap();
        assert_eq!(session.conversation().len(), 1 + 2 * (n + 1));
        assert_eq!(session.exchanges(), n + 1);
    }

    let messages = session.conversation().messages();
    assert_eq!(messages[0].role(), Role::Assistant);
    for (i, msg) in messages.iter().enumerate().skip(1) {
        let expected = if i % 2 == 1 { Role::User } else { Role::Assistant };
        assert_eq!(msg.role(), expected, "message {} has the wrong role", i);
        if msg.role() == Role::User {
            assert!(msg.sources().is_none());
            assert_eq!(msg.text(), questions[(i - 1) / 2]);
        }
    }

    assert_eq!(messages[6].text(), PromptConfig::default().empty_answer);
    assert_eq!(messages[8].sources().map(|s| s.len()), Some(1));

    let prompts: Vec<String> = client.requests().into_iter().map(|r| r.prompt).collect();
    assert_eq!(prompts, questions);
}

#[tokio::test]
async fn blank_input_is_rejected_before_anything_is_sent() {
    let client = ScriptedClient::new();
    let mut session = ChatSession::new(service(client.clone()));

    assert_eq!(session.submit("   \n\t").await, Err(SubmitError::EmptyInput));
    assert_eq!(session.submit("").await, Err(SubmitError::EmptyInput));
    assert_eq!(session.conversation().len(), 1);
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn submitted_text_is_kept_verbatim() {
    let client = ScriptedClient::new();
    client.answer("ok");
    let mut session = ChatSession::new(service(client.clone()));

    session.submit("  padded question  ").await.unwrap();

    assert_eq!(session.conversation().messages()[1].text(), "  padded question  ");
    assert_eq!(client.requests()[0].prompt, "  padded question  ");
}
