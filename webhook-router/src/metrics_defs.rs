use shared::metrics_defs::{MetricDef, MetricType};

pub const WEBHOOK_RECEIVED: MetricDef = MetricDef {
    name: "webhook.received",
    metric_type: MetricType::Counter,
    description: "Inbound webhooks and slash commands. Tagged with source.",
};

pub const NOTIFICATION_SENT: MetricDef = MetricDef {
    name: "notification.sent",
    metric_type: MetricType::Counter,
    description: "Slack notifications delivered. Tagged with the response status, or error.",
};

pub const RESOURCE_CREATED: MetricDef = MetricDef {
    name: "resource.created",
    metric_type: MetricType::Counter,
    description: "Remote issue and work package creation attempts. Tagged with target, outcome.",
};

pub const TASK_SUBMITTED: MetricDef = MetricDef {
    name: "task.submitted",
    metric_type: MetricType::Counter,
    description: "LLM jobs offered to the task queue. Tagged with outcome.",
};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "request.duration",
    metric_type: MetricType::Histogram,
    description: "Request duration in seconds. Tagged with status, endpoint.",
};

pub const ALL_METRICS: &[MetricDef] = &[
    WEBHOOK_RECEIVED,
    NOTIFICATION_SENT,
    RESOURCE_CREATED,
    TASK_SUBMITTED,
    REQUEST_DURATION,
];
