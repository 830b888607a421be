//! Manifest bodies for the objects a network is made of.
//!
//! Every builder returns a complete object ready to POST. Nothing here talks
//! to the cluster.

use kubegeth_cluster::Manifest;
use kubegeth_core::CredentialBundle;
use serde_json::{json, Map, Value};

/// Secret holding the signer's address, private key and password.
pub const SECRET_NAME: &str = "geth-secret";

/// Config map holding the genesis document.
pub const CONFIG_NAME: &str = "geth-config";

/// Key of the genesis document inside [`CONFIG_NAME`].
pub const GENESIS_KEY: &str = "genesis.json";

/// Service and deployment name of the signer node.
pub const SIGNER_NAME: &str = "geth";

/// Service and deployment name of the light client.
pub const LIGHT_NAME: &str = "geth-light";

pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
pub const MANAGED_BY: &str = "kubegeth";

pub const HTTP_RPC_PORT: u16 = 8545;
pub const WS_RPC_PORT: u16 = 8546;
pub const P2P_PORT: u16 = 30303;

const DATA_DIR: &str = "/data";
const CONFIG_DIR: &str = "/config";
const SECRET_DIR: &str = "/secret";

pub fn namespace(name: &str) -> Manifest {
    Manifest::new(json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "labels": { MANAGED_BY_LABEL: MANAGED_BY }
        }
    }))
}

/// Opaque secret with one key per credential (`address`, `private_key`,
/// `password`). Values go in `stringData`; the API server encodes them.
pub fn account_secret(bundle: &CredentialBundle) -> Manifest {
    let string_data: Map<String, Value> = bundle
        .entries()
        .into_iter()
        .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
        .collect();

    Manifest::new(json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "type": "Opaque",
        "metadata": {
            "name": SECRET_NAME,
            "labels": labels(SIGNER_NAME)
        },
        "stringData": string_data
    }))
}

pub fn genesis_config(genesis_json: &str) -> Manifest {
    Manifest::new(json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {
            "name": CONFIG_NAME,
            "labels": labels(SIGNER_NAME)
        },
        "data": { GENESIS_KEY: genesis_json }
    }))
}

pub fn signer_service() -> Manifest {
    node_service(SIGNER_NAME)
}

pub fn light_service() -> Manifest {
    node_service(LIGHT_NAME)
}

/// The mining node.
///
/// Two init containers initialize the data directory from the genesis config
/// map and import the signer key from the secret; the node then mines with
/// that account unlocked.
pub fn signer_deployment(image: &str, chain_id: u64) -> Manifest {
    let genesis_path = format!("{CONFIG_DIR}/{GENESIS_KEY}");
    let password_path = format!("{SECRET_DIR}/password");
    let key_path = format!("{SECRET_DIR}/private_key");

    let init_containers = json!([
        {
            "name": "init-genesis",
            "image": image,
            "args": ["--datadir", DATA_DIR, "init", genesis_path],
            "volumeMounts": [data_mount(), config_mount()]
        },
        {
            "name": "import-key",
            "image": image,
            "command": ["sh", "-c"],
            "args": [format!(
                "geth account list --datadir {DATA_DIR} | grep -q . || \
                 geth account import --datadir {DATA_DIR} --password {password_path} {key_path}"
            )],
            "volumeMounts": [data_mount(), secret_mount()]
        }
    ]);

    let mut args = node_args();
    args.extend(
        [
            "--networkid".to_string(),
            chain_id.to_string(),
            "--mine".into(),
            "--miner.etherbase".into(),
            "$(SIGNER_ADDRESS)".into(),
            "--unlock".into(),
            "$(SIGNER_ADDRESS)".into(),
            "--password".into(),
            password_path,
            "--allow-insecure-unlock".into(),
        ],
    );

    let container = json!({
        "name": SIGNER_NAME,
        "image": image,
        "args": args,
        "env": [{
            "name": "SIGNER_ADDRESS",
            "valueFrom": { "secretKeyRef": { "name": SECRET_NAME, "key": "address" } }
        }],
        "ports": container_ports(),
        "volumeMounts": [data_mount(), secret_mount()]
    });

    let volumes = json!([
        { "name": "data", "emptyDir": {} },
        { "name": "config", "configMap": { "name": CONFIG_NAME } },
        { "name": "secret", "secret": { "secretName": SECRET_NAME } }
    ]);

    deployment(SIGNER_NAME, json!({
        "initContainers": init_containers,
        "containers": [container],
        "volumes": volumes
    }))
}

/// A light-sync node with no local accounts.
pub fn light_deployment(image: &str) -> Manifest {
    let mut args = node_args();
    args.extend(["--syncmode".to_string(), "light".into()]);

    let container = json!({
        "name": LIGHT_NAME,
        "image": image,
        "args": args,
        "ports": container_ports(),
        "volumeMounts": [data_mount()]
    });

    deployment(LIGHT_NAME, json!({
        "containers": [container],
        "volumes": [{ "name": "data", "emptyDir": {} }]
    }))
}

fn labels(app: &str) -> Value {
    json!({ "app": app, MANAGED_BY_LABEL: MANAGED_BY })
}

fn node_service(app: &str) -> Manifest {
    Manifest::new(json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": { "name": app, "labels": labels(app) },
        "spec": {
            "selector": { "app": app },
            "ports": [
                { "name": "http-rpc", "port": HTTP_RPC_PORT, "targetPort": HTTP_RPC_PORT },
                { "name": "ws-rpc", "port": WS_RPC_PORT, "targetPort": WS_RPC_PORT },
                { "name": "p2p", "port": P2P_PORT, "targetPort": P2P_PORT }
            ]
        }
    }))
}

fn deployment(app: &str, pod_spec: Value) -> Manifest {
    Manifest::new(json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": { "name": app, "labels": labels(app) },
        "spec": {
            "replicas": 1,
            "selector": { "matchLabels": { "app": app } },
            "template": {
                "metadata": { "labels": labels(app) },
                "spec": pod_spec
            }
        }
    }))
}

fn node_args() -> Vec<String> {
    [
        "--datadir",
        DATA_DIR,
        "--http",
        "--http.addr",
        "0.0.0.0",
        "--http.api",
        "eth,net,web3",
        "--ws",
        "--ws.addr",
        "0.0.0.0",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn container_ports() -> Value {
    json!([
        { "name": "http-rpc", "containerPort": HTTP_RPC_PORT },
        { "name": "ws-rpc", "containerPort": WS_RPC_PORT },
        { "name": "p2p", "containerPort": P2P_PORT }
    ])
}

fn data_mount() -> Value {
    json!({ "name": "data", "mountPath": DATA_DIR })
}

fn config_mount() -> Value {
    json!({ "name": "config", "mountPath": CONFIG_DIR, "readOnly": true })
}

fn secret_mount() -> Value {
    json!({ "name": "secret", "mountPath": SECRET_DIR, "readOnly": true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubegeth_core::Account;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn bundle() -> CredentialBundle {
        let mut key = [0u8; 32];
        key[31] = 1;
        let account = Account::from_private_key(&key).unwrap();
        CredentialBundle::materialize(&account, &mut StdRng::seed_from_u64(7))
    }

    #[test]
    fn test_namespace_is_labelled() {
        let ns = namespace("dev");
        assert_eq!(ns.name(), Some("dev"));
        assert_eq!(ns.kind(), Some("Namespace"));
        assert_eq!(ns.as_value()["metadata"]["labels"][MANAGED_BY_LABEL], MANAGED_BY);
    }

    #[test]
    fn test_secret_carries_three_entries() {
        let bundle = bundle();
        let secret = account_secret(&bundle);
        let data = &secret.as_value()["stringData"];

        assert_eq!(secret.name(), Some(SECRET_NAME));
        assert_eq!(data["address"], "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf");
        assert_eq!(data["private_key"], bundle.private_key());
        assert_eq!(data["password"].as_str().unwrap().len(), 20);
        assert_eq!(data.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_config_map_holds_genesis() {
        let config = genesis_config("{\"alloc\":{}}");
        assert_eq!(config.name(), Some(CONFIG_NAME));
        assert_eq!(config.as_value()["data"][GENESIS_KEY], "{\"alloc\":{}}");
    }

    #[test]
    fn test_service_selects_its_deployment() {
        for (service, deployment) in [
            (signer_service(), signer_deployment("geth:test", 1213)),
            (light_service(), light_deployment("geth:test")),
        ] {
            let selector = &service.as_value()["spec"]["selector"]["app"];
            let pod_labels = &deployment.as_value()["spec"]["template"]["metadata"]["labels"]["app"];
            assert_eq!(selector, pod_labels);
            assert_eq!(service.as_value()["spec"]["ports"].as_array().unwrap().len(), 3);
        }
    }

    #[test]
    fn test_signer_deployment_mounts_config_and_secret() {
        let deployment = signer_deployment("ethereum/client-go:test", 4242);
        let pod = &deployment.as_value()["spec"]["template"]["spec"];

        assert_eq!(pod["volumes"][1]["configMap"]["name"], CONFIG_NAME);
        assert_eq!(pod["volumes"][2]["secret"]["secretName"], SECRET_NAME);
        assert_eq!(pod["initContainers"].as_array().unwrap().len(), 2);

        let args: Vec<&str> = pod["containers"][0]["args"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        let id = args.iter().position(|a| *a == "--networkid").unwrap();
        assert_eq!(args[id + 1], "4242");
        assert!(args.contains(&"--mine"));
        assert_eq!(pod["containers"][0]["image"], "ethereum/client-go:test");
    }

    #[test]
    fn test_light_deployment_syncs_light() {
        let deployment = light_deployment("geth:test");
        let pod = &deployment.as_value()["spec"]["template"]["spec"];
        let args = pod["containers"][0]["args"].as_array().unwrap();

        assert!(args.windows(2).any(|w| w[0] == "--syncmode" && w[1] == "light"));
        assert!(pod.get("initContainers").is_none());
        assert_eq!(deployment.name(), Some(LIGHT_NAME));
    }
}
