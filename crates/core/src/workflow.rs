//! Upload workflow orchestration.
//!
//! The workflow is a fixed, linear pipeline:
//!
//! `Setup -> Organize -> BeforeProcess -> Process -> AfterProcess ->
//! Validate -> Done`
//!
//! Every list stage is a swappable [`GroupStage`] value defaulting to
//! identity; no stage is ever skipped. The final Validate stage defaults
//! to the built-in extension validator plus violation reporting, driven
//! by the injected [`UploadConfig`]. Specializing the workflow means
//! installing a different stage value or configuration, not subclassing.

use crate::config::UploadConfig;
use crate::error::{Result, UploadError};
use crate::group::{FileGroup, FileSpecEntry};
use crate::report::report_violations;
use crate::run::{RunLog, TracingRun};
use crate::validator::validate_groups;
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Stage of the upload workflow state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStage {
    /// Side-effect-only preparation (e.g. directory creation).
    Setup,
    /// File organization pass.
    Organize,
    /// Pre-processing, typically document conversion.
    BeforeProcess,
    /// Plugin-specific main transform.
    Process,
    /// Post-processing after the main transform.
    AfterProcess,
    /// Extension validation and violation reporting.
    Validate,
    /// Terminal state; the validated list is returned.
    Done,
}

impl WorkflowStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStage::Setup => "setup",
            WorkflowStage::Organize => "organize",
            WorkflowStage::BeforeProcess => "before_process",
            WorkflowStage::Process => "process",
            WorkflowStage::AfterProcess => "after_process",
            WorkflowStage::Validate => "validate",
            WorkflowStage::Done => "done",
        }
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host-supplied context visible to every stage.
///
/// The Rust rendering of the original plugin object's ambient state:
/// the run logger, the upload target directory, the file specifications
/// and the free-form extra parameters.
pub struct StageContext<'a> {
    pub run: &'a dyn RunLog,
    pub target_dir: &'a Path,
    pub specs: &'a [FileSpecEntry],
    pub extra_params: &'a Map<String, Value>,
}

/// One pipeline stage: a pure transform from group list to group list.
pub trait GroupStage: Send + Sync {
    fn apply(&self, ctx: &StageContext<'_>, groups: Vec<FileGroup>) -> Result<Vec<FileGroup>>;
}

/// Stage that returns its input unchanged.
pub struct Identity;

impl GroupStage for Identity {
    fn apply(&self, _ctx: &StageContext<'_>, groups: Vec<FileGroup>) -> Result<Vec<FileGroup>> {
        Ok(groups)
    }
}

/// Adapter turning a closure into a [`GroupStage`].
pub struct StageFn<F>(pub F);

impl<F> GroupStage for StageFn<F>
where
    F: Fn(&StageContext<'_>, Vec<FileGroup>) -> Result<Vec<FileGroup>> + Send + Sync,
{
    fn apply(&self, ctx: &StageContext<'_>, groups: Vec<FileGroup>) -> Result<Vec<FileGroup>> {
        (self.0)(ctx, groups)
    }
}

type SetupFn = Box<dyn Fn(&StageContext<'_>) -> Result<()> + Send + Sync>;

/// Ready-made setup hook that creates the upload target directory.
pub fn create_target_dir(ctx: &StageContext<'_>) -> Result<()> {
    std::fs::create_dir_all(ctx.target_dir).map_err(|e| UploadError::OutputDirError {
        path: ctx.target_dir.to_path_buf(),
        message: e.to_string(),
    })
}

/// The upload workflow: host inputs, configuration and one swappable
/// stage per pipeline position.
///
/// Deterministic for identical inputs and configuration, aside from
/// temp paths and conversion metadata produced by stages that touch
/// the filesystem.
pub struct UploadWorkflow {
    run: Arc<dyn RunLog>,
    target_dir: PathBuf,
    specs: Vec<FileSpecEntry>,
    organized: Vec<FileGroup>,
    extra_params: Map<String, Value>,
    config: UploadConfig,
    setup: SetupFn,
    organize: Box<dyn GroupStage>,
    before_process: Box<dyn GroupStage>,
    process: Box<dyn GroupStage>,
    after_process: Box<dyn GroupStage>,
    validate: Option<Box<dyn GroupStage>>,
}

impl UploadWorkflow {
    /// Start building a workflow for the given upload target directory.
    pub fn builder(target_dir: impl Into<PathBuf>) -> UploadWorkflowBuilder {
        UploadWorkflowBuilder::new(target_dir)
    }

    /// Get the active configuration.
    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Run the complete workflow and return the upload-ready list.
    ///
    /// Data-level problems (invalid extensions, failed conversions) are
    /// handled by exclusion or fallback inside the stages; `Err` means a
    /// configuration or custom-stage bug.
    pub fn handle_upload_files(&self) -> Result<Vec<FileGroup>> {
        let ctx = StageContext {
            run: self.run.as_ref(),
            target_dir: &self.target_dir,
            specs: &self.specs,
            extra_params: &self.extra_params,
        };

        debug!(stage = %WorkflowStage::Setup, "running stage");
        (self.setup)(&ctx)?;

        let mut groups = self.organized.clone();

        debug!(stage = %WorkflowStage::Organize, groups = groups.len(), "running stage");
        groups = self.organize.apply(&ctx, groups)?;

        debug!(stage = %WorkflowStage::BeforeProcess, groups = groups.len(), "running stage");
        groups = self.before_process.apply(&ctx, groups)?;

        debug!(stage = %WorkflowStage::Process, groups = groups.len(), "running stage");
        groups = self.process.apply(&ctx, groups)?;

        debug!(stage = %WorkflowStage::AfterProcess, groups = groups.len(), "running stage");
        groups = self.after_process.apply(&ctx, groups)?;

        debug!(stage = %WorkflowStage::Validate, groups = groups.len(), "running stage");
        groups = match &self.validate {
            Some(stage) => stage.apply(&ctx, groups)?,
            None => {
                let outcome = validate_groups(groups, &self.specs, &self.config);
                report_violations(&outcome.violations, &self.config.warnings, ctx.run);
                outcome.valid
            }
        };

        info!(stage = %WorkflowStage::Done, groups = groups.len(), "upload workflow finished");
        Ok(groups)
    }
}

/// Builder for [`UploadWorkflow`].
pub struct UploadWorkflowBuilder {
    run: Arc<dyn RunLog>,
    target_dir: PathBuf,
    specs: Vec<FileSpecEntry>,
    organized: Vec<FileGroup>,
    extra_params: Map<String, Value>,
    config: UploadConfig,
    setup: SetupFn,
    organize: Box<dyn GroupStage>,
    before_process: Box<dyn GroupStage>,
    process: Box<dyn GroupStage>,
    after_process: Box<dyn GroupStage>,
    validate: Option<Box<dyn GroupStage>>,
}

impl UploadWorkflowBuilder {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            run: Arc::new(TracingRun),
            target_dir: target_dir.into(),
            specs: Vec::new(),
            organized: Vec::new(),
            extra_params: Map::new(),
            config: UploadConfig::default(),
            setup: Box::new(|_ctx: &StageContext<'_>| Ok(())),
            organize: Box::new(Identity),
            before_process: Box::new(Identity),
            process: Box::new(Identity),
            after_process: Box::new(Identity),
            validate: None,
        }
    }

    /// Set the host run logger. Defaults to [`TracingRun`].
    pub fn run(mut self, run: Arc<dyn RunLog>) -> Self {
        self.run = run;
        self
    }

    /// Set the file specifications for this run.
    pub fn specs(mut self, specs: Vec<FileSpecEntry>) -> Self {
        self.specs = specs;
        self
    }

    /// Set the pre-organized file groups for this run.
    pub fn organized(mut self, groups: Vec<FileGroup>) -> Self {
        self.organized = groups;
        self
    }

    /// Set additional host parameters, exposed to stages via
    /// [`StageContext`].
    pub fn extra_params(mut self, params: Map<String, Value>) -> Self {
        self.extra_params = params;
        self
    }

    /// Set the validation configuration. Defaults to
    /// [`UploadConfig::default`].
    pub fn config(mut self, config: UploadConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the setup hook. Defaults to a no-op; see
    /// [`create_target_dir`] for the common case.
    pub fn setup_with<F>(mut self, setup: F) -> Self
    where
        F: Fn(&StageContext<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.setup = Box::new(setup);
        self
    }

    /// Replace the organize stage.
    pub fn organize(mut self, stage: impl GroupStage + 'static) -> Self {
        self.organize = Box::new(stage);
        self
    }

    /// Replace the before-process stage (e.g. with
    /// [`crate::convert::DocumentToPages`]).
    pub fn before_process(mut self, stage: impl GroupStage + 'static) -> Self {
        self.before_process = Box::new(stage);
        self
    }

    /// Replace the main process stage.
    pub fn process(mut self, stage: impl GroupStage + 'static) -> Self {
        self.process = Box::new(stage);
        self
    }

    /// Replace the after-process stage.
    pub fn after_process(mut self, stage: impl GroupStage + 'static) -> Self {
        self.after_process = Box::new(stage);
        self
    }

    /// Override the validate stage. When unset, the built-in extension
    /// validator and violation reporter run with the configured tables.
    pub fn validate(mut self, stage: impl GroupStage + 'static) -> Self {
        self.validate = Some(Box::new(stage));
        self
    }

    /// Build the workflow, validating the configuration.
    pub fn build(self) -> Result<UploadWorkflow> {
        self.config.validate()?;

        Ok(UploadWorkflow {
            run: self.run,
            target_dir: self.target_dir,
            specs: self.specs,
            organized: self.organized,
            extra_params: self.extra_params,
            config: self.config,
            setup: self.setup,
            organize: self.organize,
            before_process: self.before_process,
            process: self.process,
            after_process: self.after_process,
            validate: self.validate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::BufferedRun;
    use serde_json::json;
    use std::path::Path;
    use std::sync::Mutex;

    fn image_specs() -> Vec<FileSpecEntry> {
        vec![FileSpecEntry::new("image_0", "image")]
    }

    #[test]
    fn test_workflow_stage_display() {
        assert_eq!(WorkflowStage::Setup.to_string(), "setup");
        assert_eq!(WorkflowStage::BeforeProcess.to_string(), "before_process");
        assert_eq!(WorkflowStage::Done.to_string(), "done");
    }

    #[test]
    fn test_default_workflow_validates_and_filters() {
        let run = Arc::new(BufferedRun::new());
        let workflow = UploadWorkflow::builder("/upload")
            .run(run.clone())
            .specs(image_specs())
            .organized(vec![
                FileGroup::new().with_file("image_0", "a.png"),
                FileGroup::new().with_file("image_0", "a.bmp"),
            ])
            .build()
            .unwrap();

        let result = workflow.handle_upload_files().unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(
            result[0].files["image_0"].as_single().unwrap(),
            Path::new("a.png")
        );
        assert_eq!(run.len(), 1);
        assert!(run.messages()[0].contains("Validation warning in 'image_0'"));
    }

    #[test]
    fn test_empty_inputs_yield_empty_output() {
        let workflow = UploadWorkflow::builder("/upload").build().unwrap();
        assert!(workflow.handle_upload_files().unwrap().is_empty());
    }

    #[test]
    fn test_stages_run_in_order() {
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        fn tracker(
            order: &Arc<Mutex<Vec<&'static str>>>,
            name: &'static str,
        ) -> impl GroupStage + 'static {
            let order = Arc::clone(order);
            StageFn(
                move |_ctx: &StageContext<'_>, groups: Vec<FileGroup>| -> Result<Vec<FileGroup>> {
                    order.lock().unwrap().push(name);
                    Ok(groups)
                },
            )
        }

        let setup_order = Arc::clone(&order);
        let workflow = UploadWorkflow::builder("/upload")
            .setup_with(move |_ctx: &StageContext<'_>| {
                setup_order.lock().unwrap().push("setup");
                Ok(())
            })
            .organize(tracker(&order, "organize"))
            .before_process(tracker(&order, "before_process"))
            .process(tracker(&order, "process"))
            .after_process(tracker(&order, "after_process"))
            .validate(tracker(&order, "validate"))
            .build()
            .unwrap();

        workflow.handle_upload_files().unwrap();

        assert_eq!(
            *order.lock().unwrap(),
            vec![
                "setup",
                "organize",
                "before_process",
                "process",
                "after_process",
                "validate"
            ]
        );
    }

    #[test]
    fn test_validate_override_replaces_builtin() {
        let run = Arc::new(BufferedRun::new());
        let workflow = UploadWorkflow::builder("/upload")
            .run(run.clone())
            .specs(image_specs())
            .organized(vec![FileGroup::new().with_file("image_0", "a.bmp")])
            .validate(StageFn(
                |_ctx: &StageContext<'_>, groups: Vec<FileGroup>| -> Result<Vec<FileGroup>> {
                    Ok(groups)
                },
            ))
            .build()
            .unwrap();

        let result = workflow.handle_upload_files().unwrap();

        // The pass-through override keeps the group the built-in
        // validator would have excluded, and nothing is reported.
        assert_eq!(result.len(), 1);
        assert!(run.is_empty());
    }

    #[test]
    fn test_process_stage_transforms_groups() {
        let workflow = UploadWorkflow::builder("/upload")
            .specs(image_specs())
            .organized(vec![FileGroup::new().with_file("image_0", "a.png")])
            .process(StageFn(
                |_ctx: &StageContext<'_>, groups: Vec<FileGroup>| -> Result<Vec<FileGroup>> {
                    Ok(groups
                        .into_iter()
                        .map(|g| g.with_meta("processed", json!(true)))
                        .collect())
                },
            ))
            .build()
            .unwrap();

        let result = workflow.handle_upload_files().unwrap();
        assert_eq!(result[0].meta["processed"], json!(true));
    }

    #[test]
    fn test_stage_error_propagates() {
        let workflow = UploadWorkflow::builder("/upload")
            .organized(vec![FileGroup::new().with_file("image_0", "a.png")])
            .process(StageFn(
                |_ctx: &StageContext<'_>, _groups: Vec<FileGroup>| -> Result<Vec<FileGroup>> {
                    Err(UploadError::StageFailed {
                        stage: "process",
                        message: "boom".to_string(),
                    })
                },
            ))
            .build()
            .unwrap();

        let err = workflow.handle_upload_files().unwrap_err();
        assert!(matches!(err, UploadError::StageFailed { stage: "process", .. }));
    }

    #[test]
    fn test_setup_create_target_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let target = temp.path().join("uploads/batch-1");

        let workflow = UploadWorkflow::builder(&target)
            .setup_with(create_target_dir)
            .build()
            .unwrap();
        workflow.handle_upload_files().unwrap();

        assert!(target.is_dir());
    }

    #[test]
    fn test_extra_params_visible_to_stages() {
        let mut params = Map::new();
        params.insert("batch".to_string(), json!("b-17"));

        let workflow = UploadWorkflow::builder("/upload")
            .extra_params(params)
            .process(StageFn(
                |ctx: &StageContext<'_>, groups: Vec<FileGroup>| -> Result<Vec<FileGroup>> {
                    assert_eq!(ctx.extra_params["batch"], json!("b-17"));
                    Ok(groups)
                },
            ))
            .build()
            .unwrap();

        workflow.handle_upload_files().unwrap();
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let result = UploadWorkflow::builder("/upload")
            .config(UploadConfig::empty().allow("image", ["png"]))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_workflow_config_accessor() {
        let workflow = UploadWorkflow::builder("/upload").build().unwrap();
        assert_eq!(workflow.config().extensions["video"], vec![".mp4"]);
    }
}
