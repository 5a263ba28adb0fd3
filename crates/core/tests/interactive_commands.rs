use async_trait::async_trait;
use webterm_core::{
    Answer, AnswerHandler, Command, CommandContext, CommandDefinition, Completion, Directive,
    HostContext, MessageKind, OptionSpec, Pipeline, Services, Stage, TerminalSettings,
    EXPIRED_MESSAGE, GENERIC_ERROR,
};

/// Asks for a name, then confirms it.
struct Register;

struct OnName;

struct OnConfirm {
    name: String,
}

#[async_trait]
impl Command for Register {
    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<Completion> {
        ctx.write_text("Registering a new user.");
        Ok(ctx.ask_text("Enter a name:", OnName))
    }
}

#[async_trait]
impl AnswerHandler for OnName {
    async fn on_answer(
        self: Box<Self>,
        answer: Answer,
        ctx: &mut CommandContext,
    ) -> anyhow::Result<Completion> {
        let name = answer.text().unwrap_or_default().trim().to_string();
        if name.is_empty() {
            return Ok(ctx.exit_with_error("A name is required."));
        }
        Ok(ctx.ask_confirmation(format!("Register '{name}'?"), OnConfirm { name }))
    }
}

#[async_trait]
impl AnswerHandler for OnConfirm {
    async fn on_answer(
        self: Box<Self>,
        answer: Answer,
        ctx: &mut CommandContext,
    ) -> anyhow::Result<Completion> {
        if answer.is_confirmed() {
            ctx.write_success(format!("Registered {}.", self.name));
        } else {
            ctx.write_text("Cancelled.");
        }
        Ok(ctx.exit())
    }
}

struct Secret;

struct OnSecret;

#[async_trait]
impl Command for Secret {
    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<Completion> {
        Ok(ctx.ask_password("Password:", OnSecret))
    }
}

#[async_trait]
impl AnswerHandler for OnSecret {
    async fn on_answer(
        self: Box<Self>,
        answer: Answer,
        ctx: &mut CommandContext,
    ) -> anyhow::Result<Completion> {
        ctx.write_text(format!("{} characters", answer.text().unwrap_or_default().len()));
        Ok(ctx.exit())
    }
}

struct Export;

#[async_trait]
impl Command for Export {
    fn options(&self) -> Vec<OptionSpec> {
        vec![OptionSpec::single_value("-n", "File name")]
    }

    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<Completion> {
        let name = ctx.options().value("-n").unwrap_or("export.txt").to_string();
        ctx.write_file(b"exported".to_vec(), name, "text/plain");
        Ok(ctx.exit())
    }
}

struct Broken {
    push_first: bool,
}

#[async_trait]
impl Command for Broken {
    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<Completion> {
        ctx.write_text("starting");
        if self.push_first {
            ctx.write_file(b"partial".to_vec(), "partial.txt", "text/plain");
        }
        Err(anyhow::anyhow!("database unavailable").context("loading users"))
    }
}

struct Panics;

#[async_trait]
impl Command for Panics {
    async fn execute(&self, _ctx: &mut CommandContext) -> anyhow::Result<Completion> {
        panic!("handler bug")
    }
}

fn pipeline_with(settings: TerminalSettings) -> Pipeline {
    let services = Services::builder().settings(settings).build().unwrap();
    let registry = services.registry();
    registry.register(CommandDefinition::new("register", "Registers a user", Register)).unwrap();
    registry.register(CommandDefinition::new("secret", "Asks a secret", Secret)).unwrap();
    registry.register(CommandDefinition::new("export", "Exports data", Export)).unwrap();
    registry
        .register(CommandDefinition::new("broken", "", Broken { push_first: false }))
        .unwrap();
    registry
        .register(CommandDefinition::new("broken-push", "", Broken { push_first: true }))
        .unwrap();
    registry.register(CommandDefinition::new("panics", "", Panics)).unwrap();
    Pipeline::new(services)
}

fn pipeline() -> Pipeline {
    pipeline_with(TerminalSettings::default())
}

#[tokio::test]
async fn chained_questions_issue_a_fresh_key_each_turn() {
    let pipeline = pipeline();
    let host = HostContext::anonymous();

    let first = pipeline.execute("register", host.clone()).await;
    assert_eq!(first.stage, Stage::Done);
    assert_eq!(first.status, None);
    let texts: Vec<_> = first.envelope.texts().collect();
    assert_eq!(texts, vec!["Registering a new user.", "", "Enter a name:"]);
    let first_key = first.envelope.queued_job().unwrap().to_string();

    let second = pipeline.run_job(&first_key, "alice", host.clone()).await;
    second.outcome.unwrap();
    let texts: Vec<_> = second.envelope.texts().collect();
    assert_eq!(
        texts,
        vec![
            "Register 'alice'?",
            "Only 'yes' will be accepted to approve.",
            "Enter a value:"
        ]
    );
    let second_key = second.envelope.queued_job().unwrap().to_string();
    assert_ne!(first_key, second_key);

    let replay = pipeline.run_job(&first_key, "bob", host.clone()).await;
    assert!(replay.outcome.unwrap_err().is_not_found());
    assert_eq!(replay.envelope.messages[0].text, EXPIRED_MESSAGE);

    let third = pipeline.run_job(&second_key, "yes", host).await;
    third.outcome.unwrap();
    assert_eq!(third.envelope.messages[0].text, "Registered alice.");
    assert_eq!(third.envelope.messages[0].kind, MessageKind::Success);
    assert!(third.envelope.queued_job().is_none());
    assert!(pipeline.services().jobs().is_empty());
}

#[tokio::test]
async fn declined_confirmation() {
    let pipeline = pipeline();
    let host = HostContext::anonymous();
    let first = pipeline.execute("register", host.clone()).await;
    let key = first.envelope.queued_job().unwrap().to_string();
    let second = pipeline.run_job(&key, "carol", host.clone()).await;
    let key = second.envelope.queued_job().unwrap().to_string();

    let third = pipeline.run_job(&key, "y", host).await;
    assert_eq!(third.envelope.messages[0].text, "Cancelled.");
}

#[tokio::test]
async fn masked_question_toggles_mask_around_the_answer() {
    let pipeline = pipeline();
    let host = HostContext::anonymous();
    let execution = pipeline.execute("secret", host.clone()).await;

    let key = execution.envelope.queued_job().unwrap().to_string();
    assert_eq!(
        execution.envelope.directives,
        vec![
            Directive::set_prompt(""),
            Directive::SetHistory { enabled: false },
            Directive::SetMask { enabled: true },
            Directive::QueueJob {
                key: key.clone(),
                before_send: vec![Directive::SetMask { enabled: false }],
            },
        ]
    );
    // Nothing was written before the question, so no separator.
    assert_eq!(execution.envelope.messages.len(), 1);

    let answered = pipeline.run_job(&key, "hunter2", host).await;
    assert_eq!(answered.envelope.messages[0].text, "7 characters");
    assert_eq!(
        answered.envelope.directives,
        vec![
            Directive::SetHistory { enabled: true },
            Directive::set_prompt("> "),
        ]
    );
}

#[tokio::test]
async fn write_file_queues_a_download() {
    let pipeline = pipeline();
    let host = HostContext::anonymous();
    let execution = pipeline.execute("export -n data.txt", host.clone()).await;
    let key = execution.envelope.queued_job().unwrap().to_string();
    assert_eq!(pipeline.services().jobs().len(), 1);

    let download = pipeline.run_job(&key, "", host).await;
    download.outcome.unwrap();
    assert_eq!(
        download.envelope.directives,
        vec![Directive::download("data.txt", "text/plain", b"exported")]
    );
}

#[tokio::test]
async fn failing_handler_yields_one_error_and_leaves_pool_alone() {
    let pipeline = pipeline();
    let execution = pipeline.execute("broken", HostContext::anonymous()).await;

    assert_eq!(execution.stage, Stage::Done);
    assert_eq!(execution.status, None);
    assert_eq!(execution.envelope.count(MessageKind::Error), 1);
    assert!(execution.envelope.texts().any(|t| t == GENERIC_ERROR));
    assert!(execution.envelope.texts().any(|t| t == "starting"));
    assert!(pipeline.services().jobs().is_empty());
}

#[tokio::test]
async fn failing_handler_keeps_jobs_it_pushed() {
    let pipeline = pipeline();
    let execution = pipeline.execute("broken-push", HostContext::anonymous()).await;
    assert_eq!(execution.envelope.count(MessageKind::Error), 1);
    assert_eq!(pipeline.services().jobs().len(), 1);
}

#[tokio::test]
async fn display_exceptions_shows_the_error_chain() {
    let settings = TerminalSettings {
        display_exceptions: true,
        ..TerminalSettings::default()
    };
    let pipeline = pipeline_with(settings);
    let execution = pipeline.execute("broken", HostContext::anonymous()).await;
    assert!(execution
        .envelope
        .texts()
        .any(|t| t == "loading users: database unavailable"));
}

#[tokio::test]
async fn panicking_handler_is_contained() {
    let pipeline = pipeline();
    let execution = pipeline.execute("panics", HostContext::anonymous()).await;
    assert_eq!(execution.stage, Stage::Done);
    assert_eq!(execution.envelope.count(MessageKind::Error), 1);
    assert!(pipeline.services().jobs().is_empty());
}

#[tokio::test]
async fn files_builtin_round_trip() {
    let pipeline = pipeline();
    let host = HostContext::anonymous().with_user("dana");

    let listing = pipeline.execute("files -l", host.clone()).await;
    assert_eq!(listing.envelope.messages[0].text, "No files.");

    let upload = pipeline
        .upload(
            webterm_core::FileUpload {
                name: "notes.md".into(),
                mime_type: "text/markdown".into(),
                data: b"# notes".to_vec(),
            },
            host.clone(),
        )
        .await;
    let id = upload.messages[1].text.clone();

    let listing = pipeline.execute("files -l", host.clone()).await;
    assert!(listing.envelope.texts().any(|t| t.starts_with(&id) && t.contains("notes.md")));

    let download = pipeline.execute(&format!("files -d {id}"), host.clone()).await;
    let key = download.envelope.queued_job().unwrap().to_string();
    let job = pipeline.run_job(&key, "", host.clone()).await;
    assert_eq!(
        job.envelope.directives,
        vec![Directive::download("notes.md", "text/markdown", b"# notes")]
    );

    let removed = pipeline.execute(&format!("files -r {id}"), host.clone()).await;
    assert_eq!(removed.envelope.messages[0].kind, MessageKind::Success);

    let missing = pipeline.execute(&format!("files -d {id}"), host).await;
    assert_eq!(missing.envelope.count(MessageKind::Error), 1);
}

#[tokio::test]
async fn disabled_upload_rejects_files() {
    let mut settings = TerminalSettings::default();
    settings.builtins.insert(
        "upload".to_string(),
        webterm_core::BuiltinSettings {
            enabled: false,
            ..Default::default()
        },
    );
    let pipeline = pipeline_with(settings);
    let envelope = pipeline
        .upload(
            webterm_core::FileUpload {
                name: "x.bin".into(),
                mime_type: "application/octet-stream".into(),
                data: vec![0, 1, 2],
            },
            HostContext::anonymous(),
        )
        .await;
    assert_eq!(envelope.count(MessageKind::Error), 1);
    assert!(pipeline.services().files().list().await.unwrap().is_empty());
}
