use aiconnect_model::{Llm, LlmRequest, MockLlm, ModelError, Role};

#[tokio::test]
async fn test_mock_records_requests() {
    let llm = MockLlm::new("mock").with_response("canned");

    let response = llm.generate(LlmRequest::from_prompt("first")).await.unwrap();
    assert_eq!(response.text, "canned");

    llm.generate(LlmRequest::from_prompt("second")).await.unwrap();

    let requests = llm.requests();
    assert_eq!(llm.call_count(), 2);
    assert_eq!(requests[0].messages[0].role, Role::User);
    assert_eq!(requests[1].messages[0].content, "second");
}

#[tokio::test]
async fn test_mock_error_still_counts_call() {
    let llm = MockLlm::new("mock").with_error("quota exhausted");

    let err = llm.generate(LlmRequest::from_prompt("q")).await.unwrap_err();

    assert!(matches!(err, ModelError::Api { .. }));
    assert!(err.to_string().contains("quota exhausted"));
    assert_eq!(llm.call_count(), 1);
}
