use super::*;
use crate::driver::FakeDriver;
use crate::scope::StaticSessionDirectory;
use oc_sandbox_core::config::ContainerConfig;
use serde_json::json;

const PROJECT_ID: &str = "abcdef1234567890";
const PROJECT_ROOT: &str = "/home/u/p";
const CONTAINER_NAME: &str = "oc-abcdef12-sess";

fn scenario_config() -> Config {
    Config {
        enabled: true,
        intercepted_tool_names: vec![ToolName::Shell, ToolName::Read, ToolName::Write, ToolName::Grep],
        runtime_binary: "docker".to_string(),
        bypass_prefixes: vec!["docker ".to_string()],
        state_file_path: None,
        scope: oc_sandbox_core::RoutingScope::Root,
        fallback_to_host: false,
        container: ContainerConfig {
            name_prefix: "oc".to_string(),
            image: "img:1".to_string(),
            workdir: "/workspace".to_string(),
            auto_create: true,
            auto_start: true,
            ..ContainerConfig::default()
        },
    }
}

fn args_from(value: serde_json::Value) -> ToolArgs {
    ToolArgs::new(value.as_object().unwrap().clone())
}

fn new_router(config: Config, driver: FakeDriver) -> Router<StaticSessionDirectory, FakeDriver> {
    let path = tempfile::tempdir().unwrap().into_path().join("state.json");
    Router::new(config, PROJECT_ID, PROJECT_ROOT, StateStore::new(path), StaticSessionDirectory::new(), driver)
        .with_path_checker(|_| true)
}

#[tokio::test]
async fn scenario_1_intercepts_shell_in_root_scope_with_auto_create() {
    let driver = FakeDriver::new();
    driver.push_output("", "no such container", 1); // inspect: absent
    driver.push_success(""); // run -d
    let router = new_router(scenario_config(), driver);

    let call = ToolCall {
        tool: ToolName::Shell,
        session_id: "sess-ROOT-xyz".to_string(),
        call_id: "c0".to_string(),
    };
    let mut args = args_from(json!({"command": "ls && pwd", "cwd": "/home/u/p/sub"}));

    router.pre_execute(&call, &mut args).await;

    assert_eq!(
        args.command(),
        Some(r#"docker exec -i --workdir "/workspace/sub" "oc-abcdef12-sess" sh -lc "ls && pwd""#)
    );
    assert_eq!(router.state.get("sess-ROOT-xyz").await, Some(CONTAINER_NAME.to_string()));
}

#[tokio::test]
async fn scenario_2_bypass_prefix_is_not_rewritten() {
    let driver = FakeDriver::new();
    let router = new_router(scenario_config(), driver);

    let call = ToolCall {
        tool: ToolName::Shell,
        session_id: "sess-ROOT-xyz".to_string(),
        call_id: "c0".to_string(),
    };
    let mut args = args_from(json!({"command": "docker ps"}));

    router.pre_execute(&call, &mut args).await;

    assert_eq!(args.command(), Some("docker ps"));
    assert_eq!(router.state.get("sess-ROOT-xyz").await, None);
    assert!(router.driver.calls().is_empty());
}

#[tokio::test]
async fn scenario_3_read_round_trip_overwrites_output_with_container_contents() {
    let driver = FakeDriver::new();
    driver.push_success("true"); // inspect: running
    driver.push_success("AB\n"); // cat
    let router = new_router(scenario_config(), driver);
    router.state.set("sess-ROOT-xyz", CONTAINER_NAME, 1).await.unwrap();

    let call = ToolCall {
        tool: ToolName::Read,
        session_id: "sess-ROOT-xyz".to_string(),
        call_id: "c1".to_string(),
    };
    let mut args = args_from(json!({"filePath": "/home/u/p/src/x.ts"}));
    router.pre_execute(&call, &mut args).await;

    let mut output = ToolOutput::default();
    router.post_execute(ToolName::Read, "c1", &mut output).await;

    assert_eq!(output.output, "AB\n");
}

#[tokio::test]
async fn scenario_4_grep_remaps_relative_paths_to_host() {
    let driver = FakeDriver::new();
    driver.push_success("true"); // inspect: running
    driver.push_success("src/a.ts|42|  TODO: foo\nsrc/b.ts|7| TODO: bar");
    let router = new_router(scenario_config(), driver);
    router.state.set("sess-ROOT-xyz", CONTAINER_NAME, 1).await.unwrap();

    let call = ToolCall {
        tool: ToolName::Grep,
        session_id: "sess-ROOT-xyz".to_string(),
        call_id: "c2".to_string(),
    };
    let mut args = args_from(json!({"pattern": "TODO"}));
    router.pre_execute(&call, &mut args).await;

    let mut output = ToolOutput::default();
    router.post_execute(ToolName::Grep, "c2", &mut output).await;

    assert_eq!(
        output.output,
        "/home/u/p/src/a.ts|42|  TODO: foo\n/home/u/p/src/b.ts|7| TODO: bar"
    );
}

#[tokio::test]
async fn scenario_5_write_sync_copies_host_file_into_container() {
    let driver = FakeDriver::new();
    driver.push_success("true"); // inspect: running
    driver.push_success(""); // mkdir -p
    driver.push_success(""); // cp
    let router = new_router(scenario_config(), driver);
    router.state.set("sess-ROOT-xyz", CONTAINER_NAME, 1).await.unwrap();

    let call = ToolCall {
        tool: ToolName::Write,
        session_id: "sess-ROOT-xyz".to_string(),
        call_id: "c3".to_string(),
    };
    let mut args = args_from(json!({"filePath": "/home/u/p/src/new.ts"}));
    router.pre_execute(&call, &mut args).await;

    let mut output = ToolOutput::default();
    router.post_execute(ToolName::Write, "c3", &mut output).await;

    let calls = router.driver.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[1].iter().any(|a| a.contains("mkdir -p")));
    assert_eq!(
        calls[2],
        vec!["cp".to_string(), "/home/u/p/src/new.ts".to_string(), "oc-abcdef12-sess:/workspace/src/new.ts".to_string()]
    );
}

#[tokio::test]
async fn scenario_6_container_unavailable_falls_back_to_host_for_shell() {
    let driver = FakeDriver::new();
    driver.push_output("", "no such container", 1); // inspect: absent
    driver.push_output("", "disk full", 1); // create fails
    let mut config = scenario_config();
    config.fallback_to_host = true;
    let router = new_router(config, driver);

    let call = ToolCall {
        tool: ToolName::Shell,
        session_id: "sess-ROOT-xyz".to_string(),
        call_id: "c4".to_string(),
    };
    let mut args = args_from(json!({"command": "ls"}));
    router.pre_execute(&call, &mut args).await;

    assert_eq!(args.command(), Some("ls"));
}

#[tokio::test]
async fn scenario_6_container_unavailable_leaves_read_output_untouched() {
    let driver = FakeDriver::new();
    driver.push_output("", "no such container", 1); // inspect: absent
    driver.push_output("", "disk full", 1); // create fails
    let mut config = scenario_config();
    config.fallback_to_host = true;
    let router = new_router(config, driver);

    let call = ToolCall {
        tool: ToolName::Read,
        session_id: "sess-ROOT-xyz".to_string(),
        call_id: "c5".to_string(),
    };
    let mut args = args_from(json!({"filePath": "/home/u/p/src/x.ts"}));
    router.pre_execute(&call, &mut args).await;

    let mut output = ToolOutput::default();
    router.post_execute(ToolName::Read, "c5", &mut output).await;

    assert_eq!(output.output, "");
}

#[tokio::test]
async fn disabled_plugin_never_mutates_args() {
    let driver = FakeDriver::new();
    let mut config = scenario_config();
    config.enabled = false;
    let router = new_router(config, driver);

    let call = ToolCall {
        tool: ToolName::Shell,
        session_id: "sess-ROOT-xyz".to_string(),
        call_id: "c6".to_string(),
    };
    let mut args = args_from(json!({"command": "ls && pwd"}));
    router.pre_execute(&call, &mut args).await;

    assert_eq!(args.command(), Some("ls && pwd"));
    assert!(router.driver.calls().is_empty());
}

#[tokio::test]
async fn path_outside_project_root_is_never_rewritten() {
    let driver = FakeDriver::new();
    let router = new_router(scenario_config(), driver);

    let call = ToolCall {
        tool: ToolName::Read,
        session_id: "sess-ROOT-xyz".to_string(),
        call_id: "c7".to_string(),
    };
    let mut args = args_from(json!({"filePath": "/etc/passwd"}));
    router.pre_execute(&call, &mut args).await;

    let mut output = ToolOutput::default();
    router.post_execute(ToolName::Read, "c7", &mut output).await;

    assert_eq!(output.output, "");
    assert!(router.driver.calls().is_empty());
}
