//! IAM role listing and teardown
//!
//! A role can't be deleted while it still has inline policies, attached
//! managed policies or instance profile memberships. The listing calls
//! here feed the role deletion protocol, which clears those first.

use crate::aws::clients::{AwsClients, to_utc};
use crate::aws::error::sdk_error;
use anyhow::{Context, Result};
use cloudsweep_common::defaults::ROLE_PAGE_SIZE;
use cloudsweep_common::{AttachedPolicy, Page, Role};
use tracing::debug;

/// Trait for IAM operations.
#[allow(async_fn_in_trait)]
#[cfg_attr(test, mockall::automock)]
pub trait RoleOperations: Send + Sync {
    /// List one page of roles (reserved roles included)
    async fn list_roles(&self, marker: Option<String>) -> Result<Page<Role>>;

    /// List one page of inline policy names on a role
    async fn list_inline_policies(
        &self,
        role: &str,
        marker: Option<String>,
    ) -> Result<Page<String>>;

    /// List one page of managed policies attached to a role
    async fn list_attached_policies(
        &self,
        role: &str,
        marker: Option<String>,
    ) -> Result<Page<AttachedPolicy>>;

    /// List one page of instance profile names the role belongs to
    async fn list_instance_profiles_for_role(
        &self,
        role: &str,
        marker: Option<String>,
    ) -> Result<Page<String>>;

    /// Delete an inline policy from a role
    async fn delete_inline_policy(&self, role: &str, policy: &str) -> Result<()>;

    /// Detach a managed policy from a role
    async fn detach_policy(&self, role: &str, policy_arn: &str) -> Result<()>;

    /// Remove a role from an instance profile
    async fn remove_role_from_instance_profile(&self, role: &str, profile: &str) -> Result<()>;

    /// Delete a role with nothing attached
    async fn delete_role(&self, role: &str) -> Result<()>;
}

impl RoleOperations for AwsClients {
    async fn list_roles(&self, marker: Option<String>) -> Result<Page<Role>> {
        let response = self
            .iam
            .list_roles()
            .set_marker(marker)
            .max_items(ROLE_PAGE_SIZE)
            .send()
            .await
            .map_err(sdk_error)
            .context("Failed to list IAM roles")?;

        let roles = response
            .roles()
            .iter()
            .map(|r| Role {
                name: r.role_name().to_string(),
                arn: r.arn().to_string(),
                path: r.path().to_string(),
                created_at: to_utc(r.create_date()),
            })
            .collect();

        Ok(Page::truncated(
            roles,
            response.is_truncated(),
            response.marker(),
        ))
    }

    async fn list_inline_policies(&self, role: &str, marker: Option<String>) -> Result<Page<String>> {
        let response = self
            .iam
            .list_role_policies()
            .role_name(role)
            .set_marker(marker)
            .max_items(ROLE_PAGE_SIZE)
            .send()
            .await
            .map_err(sdk_error)
            .with_context(|| format!("Failed to list inline policies of role {role}"))?;

        Ok(Page::truncated(
            response.policy_names().to_vec(),
            response.is_truncated(),
            response.marker(),
        ))
    }

    async fn list_attached_policies(
        &self,
        role: &str,
        marker: Option<String>,
    ) -> Result<Page<AttachedPolicy>> {
        let response = self
            .iam
            .list_attached_role_policies()
            .role_name(role)
            .set_marker(marker)
            .max_items(ROLE_PAGE_SIZE)
            .send()
            .await
            .map_err(sdk_error)
            .with_context(|| format!("Failed to list attached policies of role {role}"))?;

        let policies = response
            .attached_policies()
            .iter()
            .filter_map(|p| {
                let arn = p.policy_arn()?.to_string();
                Some(AttachedPolicy {
                    name: p.policy_name().unwrap_or(&arn).to_string(),
                    arn,
                })
            })
            .collect();

        Ok(Page::truncated(
            policies,
            response.is_truncated(),
            response.marker(),
        ))
    }

    async fn list_instance_profiles_for_role(
        &self,
        role: &str,
        marker: Option<String>,
    ) -> Result<Page<String>> {
        let response = self
            .iam
            .list_instance_profiles_for_role()
            .role_name(role)
            .set_marker(marker)
            .max_items(ROLE_PAGE_SIZE)
            .send()
            .await
            .map_err(sdk_error)
            .with_context(|| format!("Failed to list instance profiles of role {role}"))?;

        let profiles = response
            .instance_profiles()
            .iter()
            .map(|p| p.instance_profile_name().to_string())
            .collect();

        Ok(Page::truncated(
            profiles,
            response.is_truncated(),
            response.marker(),
        ))
    }

    async fn delete_inline_policy(&self, role: &str, policy: &str) -> Result<()> {
        debug!(role = %role, policy = %policy, "Deleting inline policy");
        self.iam
            .delete_role_policy()
            .role_name(role)
            .policy_name(policy)
            .send()
            .await
            .map_err(sdk_error)
            .with_context(|| format!("Failed to delete inline policy {policy} of role {role}"))?;
        Ok(())
    }

    async fn detach_policy(&self, role: &str, policy_arn: &str) -> Result<()> {
        debug!(role = %role, policy_arn = %policy_arn, "Detaching managed policy");
        self.iam
            .detach_role_policy()
            .role_name(role)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(sdk_error)
            .with_context(|| format!("Failed to detach policy {policy_arn} from role {role}"))?;
        Ok(())
    }

    async fn remove_role_from_instance_profile(&self, role: &str, profile: &str) -> Result<()> {
        debug!(role = %role, profile = %profile, "Removing role from instance profile");
        self.iam
            .remove_role_from_instance_profile()
            .instance_profile_name(profile)
            .role_name(role)
            .send()
            .await
            .map_err(sdk_error)
            .with_context(|| format!("Failed to remove role {role} from instance profile {profile}"))?;
        Ok(())
    }

    async fn delete_role(&self, role: &str) -> Result<()> {
        debug!(role = %role, "Deleting role");
        self.iam
            .delete_role()
            .role_name(role)
            .send()
            .await
            .map_err(sdk_error)
            .with_context(|| format!("Failed to delete role {role}"))?;
        Ok(())
    }
}
