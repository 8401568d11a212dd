//! Environment-variable map construction.
//!
//! The map injected into app and worker tasks is a pure merge of named
//! partial maps — no provisioning side effects, so it can be tested
//! (and re-derived) in isolation. `BTreeMap` keeps iteration and
//! serialization order stable, which is what makes stage composition
//! byte-for-byte idempotent.

use std::collections::BTreeMap;

use shipway_config::{DeployContext, StageConfig};

use crate::refs::{QueueRefs, StaticSiteRefs};

/// Merge partial maps left to right; later maps win on key conflicts.
pub fn merge(parts: &[BTreeMap<String, String>]) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for part in parts {
        out.extend(part.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    out
}

/// Build the full environment map for a stage's app and worker tasks.
///
/// Merges the static application identifiers, the account context, and
/// the resource references produced by the static-site and queue
/// groups.
pub fn app_env_map(
    cfg: &StageConfig,
    ctx: &DeployContext,
    static_site: &StaticSiteRefs,
    queue: &QueueRefs,
) -> BTreeMap<String, String> {
    let statics = BTreeMap::from([
        (
            "DJANGO_SETTINGS_MODULE".to_string(),
            cfg.settings_module.clone(),
        ),
        (
            "DJANGO_DEBUG".to_string(),
            if cfg.debug { "True" } else { "False" }.to_string(),
        ),
        // Tasks go through the queue, never run eagerly in-process.
        ("CELERY_TASK_ALWAYS_EAGER".to_string(), "False".to_string()),
    ]);
    let context = BTreeMap::from([("AWS_ACCOUNT_ID".to_string(), ctx.account.clone())]);
    let resources = BTreeMap::from([
        (
            "AWS_STATIC_FILES_BUCKET_NAME".to_string(),
            static_site.bucket_name.clone(),
        ),
        (
            "AWS_STATIC_FILES_CLOUDFRONT_URL".to_string(),
            static_site.cdn_domain.clone(),
        ),
        (
            "SQS_DEFAULT_QUEUE_URL".to_string(),
            queue.queue_url.clone(),
        ),
    ]);

    merge(&[statics, context, resources])
}
