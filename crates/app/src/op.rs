use std::error::Error;

use crate::config::AppConfig;

#[derive(Clone, Debug, Default)]
pub struct OpContext {
    /// Loaded configuration
    pub config: AppConfig,
}

impl OpContext {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

/// Build the CLI's top-level command set from `(Variant, OpType)` pairs
///
/// Expands to:
///
/// - `Command`: a clap [`Subcommand`](clap::Subcommand) with one variant per op
/// - `OpOutput`: each op's output, printed through its `Display`
/// - `OpError`: each op's error, wrapped transparently so the user sees the
///   op's own message
/// - an [`Op`] impl on `Command` that runs the selected op
///
/// The caller must have `clap::Subcommand` in scope.
#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            tracing::debug!(command = stringify!($variant), "running command");
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
