use k8s_openapi::api::apps::v1::{DaemonSet, Deployment};
use std::collections::BTreeMap;

/// The two forms the agent is deployed as. Each kind has its own workload
/// and its own ConfigMap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WorkloadKind {
    DaemonSet,
    Deployment,
}

impl WorkloadKind {
    pub const ALL: [WorkloadKind; 2] = [WorkloadKind::DaemonSet, WorkloadKind::Deployment];

    /// Value used for the backend's `component_type` parameter and in logs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::DaemonSet => "daemonset",
            WorkloadKind::Deployment => "deployment",
        }
    }

    /// Kubernetes object kind of the workload.
    pub const fn object_kind(&self) -> &'static str {
        match self {
            WorkloadKind::DaemonSet => "DaemonSet",
            WorkloadKind::Deployment => "Deployment",
        }
    }
}

impl std::fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A workload object as read from the cluster, ready to be written back.
#[derive(Debug, Clone)]
pub enum Workload {
    DaemonSet(Box<DaemonSet>),
    Deployment(Box<Deployment>),
}

impl Workload {
    pub fn kind(&self) -> WorkloadKind {
        match self {
            Workload::DaemonSet(_) => WorkloadKind::DaemonSet,
            Workload::Deployment(_) => WorkloadKind::Deployment,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Workload::DaemonSet(ds) => ds.metadata.name.as_deref(),
            Workload::Deployment(d) => d.metadata.name.as_deref(),
        }
    }

    /// Labels of the pod template, if the workload has a spec with any.
    pub fn template_labels(&self) -> Option<&BTreeMap<String, String>> {
        let template = match self {
            Workload::DaemonSet(ds) => &ds.spec.as_ref()?.template,
            Workload::Deployment(d) => &d.spec.as_ref()?.template,
        };
        template.metadata.as_ref()?.labels.as_ref()
    }

    /// Pod template labels, creating the spec's metadata and label map when
    /// they are missing.
    pub fn template_labels_mut(&mut self) -> &mut BTreeMap<String, String> {
        let template = match self {
            Workload::DaemonSet(ds) => &mut ds.spec.get_or_insert_with(Default::default).template,
            Workload::Deployment(d) => &mut d.spec.get_or_insert_with(Default::default).template,
        };
        template
            .metadata
            .get_or_insert_with(Default::default)
            .labels
            .get_or_insert_with(BTreeMap::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::apps::v1::DaemonSetSpec;
    use k8s_openapi::api::core::v1::PodTemplateSpec;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    #[test]
    fn test_kind_strings() {
        assert_eq!(WorkloadKind::DaemonSet.to_string(), "daemonset");
        assert_eq!(WorkloadKind::Deployment.to_string(), "deployment");
        assert_eq!(WorkloadKind::Deployment.object_kind(), "Deployment");
    }

    #[test]
    fn test_template_labels_created_when_missing() {
        let mut workload = Workload::Deployment(Box::default());
        assert!(workload.template_labels().is_none());

        workload
            .template_labels_mut()
            .insert("timestamp".to_string(), "1".to_string());

        assert_eq!(
            workload.template_labels().and_then(|l| l.get("timestamp")),
            Some(&"1".to_string())
        );
    }

    #[test]
    fn test_template_labels_preserves_existing() {
        let ds = DaemonSet {
            metadata: ObjectMeta {
                name: Some("agent".to_string()),
                ..Default::default()
            },
            spec: Some(DaemonSetSpec {
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(BTreeMap::from([("app".to_string(), "agent".to_string())])),
                        ..Default::default()
                    }),
                    spec: None,
                },
                ..Default::default()
            }),
            status: None,
        };
        let mut workload = Workload::DaemonSet(Box::new(ds));

        workload
            .template_labels_mut()
            .insert("timestamp".to_string(), "2".to_string());

        let labels = workload.template_labels().expect("labels");
        assert_eq!(labels.len(), 2);
        assert_eq!(labels["app"], "agent");
        assert_eq!(workload.name(), Some("agent"));
        assert_eq!(workload.kind(), WorkloadKind::DaemonSet);
    }
}
