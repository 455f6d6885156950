mod common;

use speculate2::speculate;

speculate! {
    use std::sync::Arc;

    use ideaforge::agent::{GlobalChatReply, NewModuleSpec, Propagation};
    use ideaforge::propagation::{Affected, PropagationEngine, TurnError};
    use ideaforge_core::models::*;
    use ideaforge_core::services::StageServices;
    use ideaforge_core::CoreError;

    use crate::common::*;

    fn engine(services: &StageServices, agent: &Arc<ScriptedAgent>) -> PropagationEngine {
        PropagationEngine::new(services.clone(), agent.clone())
    }

    fn global_reply(propagation: Propagation, new_modules: Vec<NewModuleSpec>) -> GlobalChatReply {
        GlobalChatReply {
            reply: "Done".to_string(),
            is_global: true,
            propagation,
            new_modules,
        }
    }

    describe "run_turn" {
        it "updates only the stage the agent targeted" {
            let services = StageServices::from_database(memory_db());
            let (idea, plan, arch) = seed_pipeline(&services);
            let agent = ScriptedAgent::new();
            agent.push_global(Ok(global_reply(
                Propagation {
                    architecture: Some(FieldPatch::new().with(ArchitectureField::TechStack, "Rust + SQLite")),
                    ..Default::default()
                },
                Vec::new(),
            )));

            let outcome = tokio_test::block_on(engine(&services, &agent).run_turn(idea.id, "Use Rust")).unwrap();

            assert_eq!(outcome.affected, vec![Affected::Architecture]);
            let stored = services.architectures.get(arch.id).unwrap();
            let expected = Architecture {
                tech_stack: "Rust + SQLite".to_string(),
                updated_at: stored.updated_at,
                ..arch.clone()
            };
            assert_eq!(stored, expected);
            assert!(stored.updated_at >= arch.updated_at);
            assert_eq!(services.ideation.get(idea.id).unwrap(), idea);
            assert_eq!(services.action_plans.get(plan.id).unwrap(), plan);
        }

        it "sends the whole pipeline to the agent" {
            let services = StageServices::from_database(memory_db());
            let (idea, plan, arch) = seed_pipeline(&services);
            services.modules.create_module(arch.id, CreateModuleInput {
                name: "Auth".into(),
                ..Default::default()
            }).unwrap();
            let agent = ScriptedAgent::new();
            agent.push_global(Ok(global_reply(Propagation::default(), Vec::new())));

            tokio_test::block_on(engine(&services, &agent).run_turn(idea.id, "  What's next?  ")).unwrap();

            let requests = agent.global_requests.lock().unwrap();
            assert_eq!(requests.len(), 1);
            assert_eq!(requests[0].message, "What's next?");
            assert_eq!(requests[0].idea.id, idea.id);
            assert_eq!(requests[0].action_plan.as_ref().map(|p| p.id), Some(plan.id));
            assert_eq!(requests[0].architecture.as_ref().map(|a| a.id), Some(arch.id));
            assert_eq!(requests[0].modules.len(), 1);
        }

        it "logs the turn even when the agent's reply text is empty" {
            let services = StageServices::from_database(memory_db());
            let (idea, _, arch) = seed_pipeline(&services);
            let agent = ScriptedAgent::new();
            agent.push_global(Ok(GlobalChatReply {
                reply: String::new(),
                ..global_reply(
                    Propagation {
                        architecture: Some(FieldPatch::new().with(ArchitectureField::TechStack, "Rust")),
                        ..Default::default()
                    },
                    Vec::new(),
                )
            }));

            let outcome = tokio_test::block_on(engine(&services, &agent).run_turn(idea.id, "Use Rust")).unwrap();

            assert_eq!(outcome.affected, vec![Affected::Architecture]);
            assert_eq!(services.architectures.get(arch.id).unwrap().tech_stack, "Rust");
            let log = services.modules.list_global_messages(idea.id, 10).unwrap();
            assert_eq!(log.len(), 2);
            assert_eq!(log[1].role, MessageRole::Assistant);
            assert_eq!(log[1].content, "");
            assert_eq!(log[1].affected_modules, vec!["architecture".to_string()]);
        }

        it "never clears a field with an empty value" {
            let services = StageServices::from_database(memory_db());
            let (idea, _, _) = seed_pipeline(&services);
            let agent = ScriptedAgent::new();
            agent.push_global(Ok(global_reply(
                Propagation {
                    ideation: Some(FieldPatch::new().with(IdeaField::Title, "")),
                    ..Default::default()
                },
                Vec::new(),
            )));

            let outcome = tokio_test::block_on(engine(&services, &agent).run_turn(idea.id, "Rename it")).unwrap();

            assert!(outcome.affected.is_empty());
            assert_eq!(services.ideation.get(idea.id).unwrap().title, "Planner");
        }

        it "keeps the other writes when one stage fails to save" {
            let db = memory_db();
            let services = services_with_broken_plans(db);
            let (idea, _, arch) = seed_pipeline(&services);
            let agent = ScriptedAgent::new();
            agent.push_global(Ok(global_reply(
                Propagation {
                    ideation: Some(FieldPatch::new().with(IdeaField::Scope, "Mobile first")),
                    action_plan: Some(FieldPatch::new().with(ActionPlanField::BusinessLogicFlow, "Sign up, then plan")),
                    architecture: Some(FieldPatch::new().with(ArchitectureField::DatabaseType, "sqlite")),
                },
                Vec::new(),
            )));

            let outcome = tokio_test::block_on(engine(&services, &agent).run_turn(idea.id, "Go mobile")).unwrap();

            assert_eq!(outcome.affected, vec![Affected::Ideation, Affected::Architecture]);
            assert_eq!(services.ideation.get(idea.id).unwrap().scope, "Mobile first");
            assert_eq!(services.architectures.get(arch.id).unwrap().database_type, "sqlite");

            let log = services.modules.list_global_messages(idea.id, 10).unwrap();
            assert_eq!(log.len(), 2);
            assert_eq!(log[1].affected_modules, vec!["ideation".to_string(), "architecture".to_string()]);
        }

        it "creates suggested modules under the architecture" {
            let services = StageServices::from_database(memory_db());
            let (idea, _, arch) = seed_pipeline(&services);
            let agent = ScriptedAgent::new();
            agent.push_global(Ok(global_reply(
                Propagation::default(),
                vec![
                    NewModuleSpec { name: "Billing".into(), priority: 2, ..Default::default() },
                    NewModuleSpec { name: "Auth".into(), priority: 1, ..Default::default() },
                ],
            )));

            let outcome = tokio_test::block_on(engine(&services, &agent).run_turn(idea.id, "Add billing")).unwrap();

            assert_eq!(outcome.affected, vec![Affected::DevModules, Affected::DevModules]);
            let modules = services.modules.list_by_architecture(arch.id).unwrap();
            let names: Vec<&str> = modules.iter().map(|m| m.name.as_str()).collect();
            assert_eq!(names, vec!["Auth", "Billing"]);
            assert!(modules.iter().all(|m| m.status == ModuleStatus::Pending));
        }

        it "skips suggested modules while there is no architecture" {
            let services = StageServices::from_database(memory_db());
            let idea = services.ideation.create(idea_input("Solo")).unwrap();
            let agent = ScriptedAgent::new();
            agent.push_global(Ok(global_reply(
                Propagation::default(),
                vec![NewModuleSpec { name: "Auth".into(), ..Default::default() }],
            )));

            let outcome = tokio_test::block_on(engine(&services, &agent).run_turn(idea.id, "Modules?")).unwrap();

            assert!(outcome.affected.is_empty());
            assert_eq!(outcome.new_modules.len(), 1);
            let log = services.modules.list_global_messages(idea.id, 10).unwrap();
            assert_eq!(log[1].role, MessageRole::Assistant);
            assert!(log[1].affected_modules.is_empty());
        }

        it "keeps the user message but no reply when the agent fails" {
            let services = StageServices::from_database(memory_db());
            let (idea, _, _) = seed_pipeline(&services);
            let agent = ScriptedAgent::new();
            agent.push_global(Err(server_error()));

            let result = tokio_test::block_on(engine(&services, &agent).run_turn(idea.id, "Hello"));

            assert!(matches!(result, Err(TurnError::Agent(_))));
            let log = services.modules.list_global_messages(idea.id, 10).unwrap();
            assert_eq!(log.len(), 1);
            assert_eq!(log[0].role, MessageRole::User);
            assert_eq!(log[0].content, "Hello");
        }

        it "rejects a blank message before calling the agent" {
            let services = StageServices::from_database(memory_db());
            let (idea, _, _) = seed_pipeline(&services);
            let agent = ScriptedAgent::new();

            let result = tokio_test::block_on(engine(&services, &agent).run_turn(idea.id, "   "));

            assert!(matches!(result, Err(TurnError::Core(CoreError::Validation(_)))));
            assert!(agent.global_requests.lock().unwrap().is_empty());
        }

        it "fails with not found for an unknown idea" {
            let services = StageServices::from_database(memory_db());
            let agent = ScriptedAgent::new();

            let result = tokio_test::block_on(engine(&services, &agent).run_turn(uuid::Uuid::new_v4(), "Hi"));

            assert!(matches!(result, Err(TurnError::Core(CoreError::NotFound(_)))));
        }
    }
}
