//! Integration tests for IAM membership.

use domain::{AggregateCreator, IamMember, IamService};
use event_store::{IdentityContext, InMemoryEventStore};

fn create_service() -> IamService<InMemoryEventStore> {
    IamService::new(InMemoryEventStore::new(), AggregateCreator::new("iam-core"))
}

fn ctx() -> IdentityContext {
    IdentityContext::new("iam", "admin")
}

fn member(user_id: &str, roles: &[&str]) -> IamMember {
    IamMember::new(
        "iam".into(),
        user_id,
        roles.iter().map(|r| r.to_string()).collect(),
    )
}

mod add {
    use super::*;

    #[tokio::test]
    async fn added_member_is_listed() {
        let service = create_service();
        let added = service
            .add_member(&ctx(), member("alice", &["IAM_OWNER"]))
            .await
            .unwrap();
        assert_eq!(added, member("alice", &["IAM_OWNER"]));

        let iam = service.iam_by_id(&"iam".into()).await.unwrap();
        assert_eq!(iam.members, vec![added]);
    }

    #[tokio::test]
    async fn invalid_member_is_rejected() {
        let err = create_service()
            .add_member(&ctx(), member("alice", &[]))
            .await
            .unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[tokio::test]
    async fn duplicate_member_is_rejected() {
        let service = create_service();
        service
            .add_member(&ctx(), member("alice", &["IAM_OWNER"]))
            .await
            .unwrap();

        let err = service
            .add_member(&ctx(), member("alice", &["IAM_VIEWER"]))
            .await
            .unwrap_err();
        assert!(err.is_invariant_violation());
    }
}

mod change {
    use super::*;

    #[tokio::test]
    async fn roles_are_replaced() {
        let service = create_service();
        service
            .add_member(&ctx(), member("alice", &["IAM_OWNER"]))
            .await
            .unwrap();
        service
            .add_member(&ctx(), member("bob", &["IAM_VIEWER"]))
            .await
            .unwrap();

        let changed = service
            .change_member(&ctx(), member("alice", &["IAM_VIEWER", "IAM_EDITOR"]))
            .await
            .unwrap();
        assert_eq!(changed.roles, vec!["IAM_VIEWER", "IAM_EDITOR"]);

        let iam = service.iam_by_id(&"iam".into()).await.unwrap();
        assert_eq!(
            iam.member_by_user_id("alice").unwrap().roles,
            vec!["IAM_VIEWER", "IAM_EDITOR"]
        );
        assert_eq!(iam.member_by_user_id("bob").unwrap().roles, vec!["IAM_VIEWER"]);
    }

    #[tokio::test]
    async fn unknown_member_is_rejected() {
        let err = create_service()
            .change_member(&ctx(), member("alice", &["IAM_OWNER"]))
            .await
            .unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[tokio::test]
    async fn unchanged_roles_are_rejected() {
        let service = create_service();
        service
            .add_member(&ctx(), member("alice", &["IAM_OWNER"]))
            .await
            .unwrap();

        let err = service
            .change_member(&ctx(), member("alice", &["IAM_OWNER"]))
            .await
            .unwrap_err();
        assert!(err.is_invariant_violation());
    }
}

mod remove {
    use super::*;

    #[tokio::test]
    async fn removed_member_disappears() {
        let service = create_service();
        service
            .add_member(&ctx(), member("alice", &["IAM_OWNER"]))
            .await
            .unwrap();

        service
            .remove_member(&ctx(), &"iam".into(), "alice")
            .await
            .unwrap();

        let iam = service.iam_by_id(&"iam".into()).await.unwrap();
        assert!(iam.members.is_empty());

        service
            .add_member(&ctx(), member("alice", &["IAM_VIEWER"]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn removing_unknown_member_pushes_nothing() {
        let service = create_service();
        service
            .remove_member(&ctx(), &"iam".into(), "nobody")
            .await
            .unwrap();

        assert_eq!(service.handler().store().event_count().await, 0);
    }
}
