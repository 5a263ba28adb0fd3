use webterm_cli::register_demo_commands;
use webterm_core::{Directive, HostContext, MessageKind, Pipeline, Services};

fn pipeline() -> Pipeline {
    let services = Services::builder().build().unwrap();
    register_demo_commands(services.registry()).unwrap();
    Pipeline::new(services)
}

#[tokio::test]
async fn login_with_inline_password() {
    let pipeline = pipeline();
    let host = HostContext::anonymous();

    let ok = pipeline.execute("login -u demo -p demo", host.clone()).await;
    assert_eq!(ok.envelope.messages[0].text, "Hello demo!");
    assert_eq!(ok.envelope.messages[0].kind, MessageKind::Success);

    let bad = pipeline.execute("login -u demo -p nope", host).await;
    assert_eq!(bad.envelope.messages[0].text, "Invalid username or password.");
    assert_eq!(bad.status.map(|s| s.status), Some(1));
}

#[tokio::test]
async fn login_asks_for_a_masked_password() {
    let pipeline = pipeline();
    let host = HostContext::anonymous();

    let asked = pipeline.execute("login -u demo", host.clone()).await;
    assert!(asked.envelope.directives.contains(&Directive::SetMask { enabled: true }));
    let key = asked.envelope.queued_job().unwrap().to_string();

    let answered = pipeline.run_job(&key, "demo", host).await;
    answered.outcome.unwrap();
    assert_eq!(answered.envelope.messages[0].text, "Hello demo!");
}

#[tokio::test]
async fn login_without_user_shows_help() {
    let pipeline = pipeline();
    let execution = pipeline.execute("login", HostContext::anonymous()).await;
    let texts: Vec<_> = execution.envelope.texts().collect();
    assert_eq!(texts[0], "Checks a user name and password");
    assert!(texts.iter().any(|line| line.starts_with("Usage: login")));
}

#[tokio::test]
async fn greet_chains_two_questions() {
    let pipeline = pipeline();
    let host = HostContext::anonymous();

    let first = pipeline.execute("greet", host.clone()).await;
    let key = first.envelope.queued_job().unwrap().to_string();

    let second = pipeline.run_job(&key, "Ada", host.clone()).await;
    assert_eq!(second.envelope.messages[0].text, "Shout the greeting?");
    let key = second.envelope.queued_job().unwrap().to_string();

    let third = pipeline.run_job(&key, "YES", host.clone()).await;
    assert_eq!(third.envelope.messages[0].text, "HELLO ADA!");

    let direct = pipeline.execute("greet Grace Hopper", host).await;
    assert_eq!(direct.envelope.messages[0].text, "Hello Grace Hopper!");
}

#[tokio::test]
async fn download_queues_a_file() {
    let pipeline = pipeline();
    let host = HostContext::anonymous();

    let execution = pipeline.execute("download -n note.txt hello there", host.clone()).await;
    assert_eq!(execution.envelope.messages[0].text, "Downloading 'note.txt'.");
    let key = execution.envelope.queued_job().unwrap().to_string();

    let job = pipeline.run_job(&key, "", host).await;
    job.outcome.unwrap();
    assert_eq!(
        job.envelope.directives,
        vec![Directive::download("note.txt", "text/plain", b"hello there")]
    );
}
