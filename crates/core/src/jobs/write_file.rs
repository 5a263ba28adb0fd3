use async_trait::async_trait;

use super::{Job, JobContext};
use crate::response::Directive;

/// Sends a file to the client as a download.
#[derive(Debug, Clone)]
pub struct WriteFileJob {
    data: Vec<u8>,
    file_name: String,
    mime_type: String,
}

impl WriteFileJob {
    pub fn new(
        data: impl Into<Vec<u8>>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            data: data.into(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
        }
    }
}

#[async_trait]
impl Job for WriteFileJob {
    async fn execute(self: Box<Self>, ctx: &mut JobContext) -> anyhow::Result<()> {
        ctx.add_directive(Directive::download(
            self.file_name,
            self.mime_type,
            &self.data,
        ));
        Ok(())
    }
}
