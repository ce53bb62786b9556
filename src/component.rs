//! Support for TerraHub component descriptors.
//!
//! A component descriptor is a `.terrahub.yml` file holding metadata about a single Terraform
//! component together with a `template` tree that mirrors Terraform's JSON configuration
//! representation. The descriptor may carry workspace variable values in a `tfvars` section,
//! either nested inside the template or at the descriptor top level.

use crate::{Error, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

/// A TerraHub component descriptor. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Descriptor {
    /// Component name.
    #[serde(default)]
    pub component: Option<String>,

    /// Relative path to the parent project configuration.
    #[serde(default)]
    pub parent: Option<String>,

    /// Components this one depends on.
    #[serde(default, rename = "dependsOn")]
    pub depends_on: Vec<String>,

    /// The Terraform template tree, keyed by block type.
    #[serde(default)]
    pub template: Map<String, Value>,

    #[serde(default, rename = "tfvars")]
    root_tfvars: Option<Value>,
}

impl Descriptor {
    /// Parses a descriptor from YAML text.
    ///
    /// ## Errors
    ///
    /// Returns an error if the input is not valid YAML or does not have the descriptor shape.
    pub fn from_str(input: &str) -> Result<Descriptor> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Returns the Terraform template with the `tfvars` section split out.
    pub fn terraform_template(&self) -> Value {
        let mut template = self.template.clone();
        template.remove("tfvars");
        Value::Object(template)
    }

    /// Returns the workspace variable values. A `tfvars` section nested in the template takes
    /// precedence over one at the descriptor top level.
    ///
    /// ## Errors
    ///
    /// Returns an error if the descriptor has no `tfvars` section at all.
    pub fn tfvars(&self) -> Result<Value> {
        self.template
            .get("tfvars")
            .or(self.root_tfvars.as_ref())
            .cloned()
            .ok_or_else(|| Error::new("descriptor has no tfvars section"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const DESCRIPTOR: &str = indoc! {r#"
        component: s3-bucket
        parent: ../.terrahub.yml
        dependsOn:
          - ../vpc
        template:
          resource:
            aws_s3_bucket:
              main:
                bucket: my-bucket
                acl: private
          tfvars:
            region: us-east-1
    "#};

    #[test]
    fn test_from_str() {
        let descriptor = Descriptor::from_str(DESCRIPTOR).unwrap();

        assert_eq!(descriptor.component.as_deref(), Some("s3-bucket"));
        assert_eq!(descriptor.parent.as_deref(), Some("../.terrahub.yml"));
        assert_eq!(descriptor.depends_on, vec!["../vpc".to_string()]);
    }

    #[test]
    fn test_terraform_template_excludes_tfvars() {
        let descriptor = Descriptor::from_str(DESCRIPTOR).unwrap();

        assert_eq!(
            descriptor.terraform_template(),
            json!({
                "resource": {
                    "aws_s3_bucket": {
                        "main": {"bucket": "my-bucket", "acl": "private"}
                    }
                }
            })
        );
    }

    #[test]
    fn test_tfvars_from_template() {
        let descriptor = Descriptor::from_str(DESCRIPTOR).unwrap();

        assert_eq!(descriptor.tfvars().unwrap(), json!({"region": "us-east-1"}));
    }

    #[test]
    fn test_tfvars_from_top_level() {
        let input = indoc! {r#"
            component: vpc
            template:
              resource:
                aws_vpc:
                  main:
                    cidr_block: 10.0.0.0/16
            tfvars:
              cidr: 10.0.0.0/16
        "#};
        let descriptor = Descriptor::from_str(input).unwrap();

        assert_eq!(descriptor.tfvars().unwrap(), json!({"cidr": "10.0.0.0/16"}));
    }

    #[test]
    fn test_tfvars_missing() {
        let descriptor = Descriptor::from_str("component: empty\n").unwrap();

        assert!(descriptor.tfvars().is_err());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let input = indoc! {r#"
            component: cached
            build:
              commands:
                - npm install
        "#};

        assert!(Descriptor::from_str(input).is_ok());
    }
}
