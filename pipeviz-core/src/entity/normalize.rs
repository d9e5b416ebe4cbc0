use super::spec::{ContainerSpec, Genesis, Loc, ProcessSpec};
use super::{EntityGraph, EntityId, EntityKind, LinkKind};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Node ids for everything one container holds
struct ContainerIndex<'a> {
    spec: &'a ContainerSpec,
    node: EntityId,
    logic: HashMap<&'a str, EntityId>,
    processes: Vec<(&'a ProcessSpec, EntityId)>,
    data_spaces: HashMap<&'a str, EntityId>,
    /// (data space, data set, node)
    data_sets: Vec<(&'a str, &'a str, EntityId)>,
}

impl<'a> ContainerIndex<'a> {
    fn find_process(&self, loc: &Loc) -> Option<EntityId> {
        self.processes
            .iter()
            .find(|(process, _)| process.serves(loc))
            .map(|&(_, id)| id)
    }

    /// By data space and name, or by name alone when no data space is given
    fn find_data_set(&self, loc: &Loc) -> Option<EntityId> {
        let name = loc.dataset.as_deref()?;
        self.data_sets
            .iter()
            .find(|&&(space, set, _)| set == name && loc.dataspace.as_deref().map_or(true, |s| s == space))
            .map(|&(_, _, id)| id)
    }

    fn data_set(&self, space: &str, set: &str) -> Option<EntityId> {
        self.data_sets
            .iter()
            .find(|&&(s, d, _)| s == space && d == set)
            .map(|&(_, _, id)| id)
    }
}

/// Flatten containers into nodes and resolve their cross references.
///
/// Unresolvable references are skipped, never reported as errors.
pub fn normalize(containers: &[ContainerSpec]) -> EntityGraph {
    let mut graph = EntityGraph::default();

    let indexes: Vec<ContainerIndex> = containers
        .iter()
        .map(|spec| flatten(&mut graph, spec))
        .collect();

    let mut by_host: HashMap<&str, usize> = HashMap::new();
    for (i, index) in indexes.iter().enumerate() {
        let spec = index.spec;
        if by_host.insert(spec.hostname.as_str(), i).is_some() {
            warn!(hostname = %spec.hostname, "duplicate container hostname, later one wins lookups");
        }
    }

    graph.containers = by_host
        .iter()
        .map(|(&host, &i)| (host.to_string(), indexes[i].node))
        .collect();

    let resolver = Resolver {
        indexes: &indexes,
        by_host: &by_host,
    };
    for index in &indexes {
        link_references(&mut graph, index, &resolver);
    }

    debug!(
        containers = containers.len(),
        nodes = graph.nodes.len(),
        links = graph.links.len(),
        "normalized entity graph"
    );

    graph
}

/// Push a container and its children, with containment links
fn flatten<'a>(graph: &mut EntityGraph, spec: &'a ContainerSpec) -> ContainerIndex<'a> {
    let host = spec.hostname.as_str();
    let container = graph.push_node(EntityKind::Container, spec.name(), host);

    let mut index = ContainerIndex {
        spec,
        node: container,
        logic: HashMap::new(),
        processes: Vec::new(),
        data_spaces: HashMap::new(),
        data_sets: Vec::new(),
    };

    for (path, logic) in &spec.logic_states {
        let id = graph.push_node(EntityKind::Logic, logic.name(path), host);
        graph.push_link(container, id, LinkKind::Contains, None);
        index.logic.insert(path.as_str(), id);
    }

    for process in &spec.processes {
        let id = graph.push_node(EntityKind::Process, process.name(), host);
        graph.push_link(container, id, LinkKind::Contains, None);
        index.processes.push((process, id));
    }

    for name in spec.data_spaces.keys() {
        let id = graph.push_node(EntityKind::DataSpace, name.as_str(), host);
        graph.push_link(container, id, LinkKind::Contains, None);
        index.data_spaces.insert(name.as_str(), id);
    }

    for (space, data_space) in &spec.data_spaces {
        for set in data_space.datasets.keys() {
            let id = graph.push_node(EntityKind::DataSet, set.as_str(), host);
            graph.push_link(container, id, LinkKind::Contains, None);
            index.data_sets.push((space.as_str(), set.as_str(), id));
        }
    }

    index
}

struct Resolver<'r, 'a> {
    indexes: &'r [ContainerIndex<'a>],
    by_host: &'r HashMap<&'a str, usize>,
}

impl<'r, 'a> Resolver<'r, 'a> {
    /// The container a location points into
    fn container(&self, loc: &Loc, here: &'r ContainerIndex<'a>) -> Option<&'r ContainerIndex<'a>> {
        match loc.hostname.as_deref() {
            Some(host) => self.by_host.get(host).map(|&i| &self.indexes[i]),
            None => Some(here),
        }
    }
}

fn link_references<'r, 'a>(graph: &mut EntityGraph, index: &'r ContainerIndex<'a>, resolver: &Resolver<'r, 'a>) {
    let spec = index.spec;

    // Logic states to the processes serving the data they use
    for (path, logic) in &spec.logic_states {
        let Some(&source) = index.logic.get(path.as_str()) else {
            continue;
        };
        for (name, link) in &logic.datasets {
            let target = resolver
                .container(&link.loc, index)
                .and_then(|container| container.find_process(&link.loc));
            match target {
                Some(target) => graph.push_link(source, target, LinkKind::DataUsage, Some(name.clone())),
                None => debug!(logic = %path, dataset = %name, "no process serves dataset location"),
            }
        }
    }

    // Processes to what they run and manage
    for &(process, source) in &index.processes {
        for path in &process.logic_states {
            match index.logic.get(path.as_str()) {
                Some(&target) => graph.push_link(source, target, LinkKind::Runs, None),
                None => debug!(pid = process.pid, logic = %path, "process references unknown logic state"),
            }
        }
        for name in &process.data_spaces {
            match index.data_spaces.get(name.as_str()) {
                Some(&target) => graph.push_link(source, target, LinkKind::Manages, None),
                None => debug!(pid = process.pid, dataspace = %name, "process references unknown data space"),
            }
        }
    }

    // Data spaces to their sets, and sets to their origins
    for (space, data_space) in &spec.data_spaces {
        let Some(&space_id) = index.data_spaces.get(space.as_str()) else {
            continue;
        };
        for (name, set) in &data_space.datasets {
            let Some(set_id) = index.data_set(space, name) else {
                continue;
            };
            graph.push_link(space_id, set_id, LinkKind::Holds, None);

            if let Genesis::Origin(loc) = &set.genesis {
                let origin = resolver
                    .container(loc, index)
                    .and_then(|container| container.find_data_set(loc));
                match origin {
                    Some(origin) => graph.push_link(set_id, origin, LinkKind::Genesis, None),
                    None => debug!(dataspace = %space, dataset = %name, "dataset genesis not found"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityLink;
    use pretty_assertions::assert_eq;

    fn containers() -> Vec<ContainerSpec> {
        serde_json::from_str(
            r#"[
                {
                    "hostname": "web01",
                    "nick": "web",
                    "logic-states": {
                        "/var/www/shop": {
                            "type": "code",
                            "datasets": {
                                "users": {"loc": {"hostname": "db01", "type": "net", "port": 3306}},
                                "sessions": {"loc": {"type": "unix", "path": "/run/redis.sock"}},
                                "orders": {"loc": {"hostname": "nowhere", "port": 5432}}
                            }
                        }
                    },
                    "processes": [
                        {"pid": 100, "logic-states": ["/var/www/shop", "/missing"], "listen": [{"type": "port", "port": 80}]},
                        {"pid": 200, "nick": "redis", "data-spaces": ["cache"], "listen": [{"type": "unix", "path": "/run/redis.sock"}]}
                    ],
                    "data-spaces": {
                        "cache": {"datasets": {"sessions": {"genesis": "α"}}}
                    }
                },
                {
                    "hostname": "db01",
                    "processes": [
                        {"pid": 300, "nick": "mysqld", "data-spaces": ["mysql"], "listen": [{"type": "port", "port": 3306}]}
                    ],
                    "data-spaces": {
                        "mysql": {"datasets": {
                            "users": {"genesis": "α"},
                            "users-copy": {"genesis": {"dataspace": "mysql", "dataset": "users"}},
                            "sessions-snap": {"genesis": {"hostname": "web01", "dataset": "sessions"}},
                            "orphan": {"genesis": {"dataspace": "mysql", "dataset": "gone"}}
                        }}
                    }
                }
            ]"#,
        )
        .unwrap()
    }

    fn has_link(graph: &EntityGraph, source: EntityId, target: EntityId, kind: LinkKind) -> bool {
        graph
            .links()
            .iter()
            .any(|l| l.source == source && l.target == target && l.kind == kind)
    }

    #[test]
    fn test_flatten_order_and_kinds() {
        let graph = normalize(&containers());
        let kinds: Vec<_> = graph.nodes().iter().map(|n| n.kind.tag()).collect();

        assert_eq!(
            kinds,
            vec![
                "container", "logic", "process", "process", "dataspace", "dataset",
                "container", "process", "dataspace", "dataset", "dataset", "dataset", "dataset",
            ]
        );
        assert_eq!(graph.node(EntityId(0)).name, "web");
        assert_eq!(graph.node(EntityId(1)).name, "shop");
        assert_eq!(graph.node(EntityId(2)).name, "pid 100");
        assert_eq!(graph.node(EntityId(6)).name, "db01");
    }

    #[test]
    fn test_containment_links() {
        let graph = normalize(&containers());
        let web = graph.container("web01").unwrap();
        let db = graph.container("db01").unwrap();

        assert_eq!(web, EntityId(0));
        assert_eq!(db, EntityId(6));

        let contained = graph
            .links_of(LinkKind::Contains)
            .filter(|l| l.source == web)
            .count();
        assert_eq!(contained, 5);

        for link in graph.links_of(LinkKind::Contains) {
            assert_eq!(graph.link_strength(link), 1.0);
        }
    }

    #[test]
    fn test_data_usage_resolution() {
        let graph = normalize(&containers());
        let shop = graph.find("web01", EntityKind::Logic, "shop").unwrap();
        let mysqld = graph.find("db01", EntityKind::Process, "mysqld").unwrap();
        let redis = graph.find("web01", EntityKind::Process, "redis").unwrap();

        let usage: Vec<&EntityLink> = graph.links_of(LinkKind::DataUsage).collect();
        assert_eq!(usage.len(), 2);

        // Cross-host by hostname
        assert!(has_link(&graph, shop, mysqld, LinkKind::DataUsage));
        // Same container by unix socket path
        assert!(has_link(&graph, shop, redis, LinkKind::DataUsage));

        let names: Vec<_> = usage.iter().filter_map(|l| l.name.as_deref()).collect();
        assert_eq!(names, vec!["sessions", "users"]);
        assert_eq!(graph.link_strength(usage[0]), 0.5);
    }

    #[test]
    fn test_process_links() {
        let graph = normalize(&containers());
        let web_proc = graph.find("web01", EntityKind::Process, "pid 100").unwrap();
        let shop = graph.find("web01", EntityKind::Logic, "shop").unwrap();
        let redis = graph.find("web01", EntityKind::Process, "redis").unwrap();
        let cache = graph.find("web01", EntityKind::DataSpace, "cache").unwrap();

        assert!(has_link(&graph, web_proc, shop, LinkKind::Runs));
        assert!(has_link(&graph, redis, cache, LinkKind::Manages));
        // "/missing" is silently skipped
        assert_eq!(graph.links_of(LinkKind::Runs).count(), 1);
        assert_eq!(graph.links_of(LinkKind::Manages).count(), 2);
    }

    #[test]
    fn test_genesis_links() {
        let graph = normalize(&containers());
        let users = graph.find("db01", EntityKind::DataSet, "users").unwrap();
        let copy = graph.find("db01", EntityKind::DataSet, "users-copy").unwrap();
        let snap = graph.find("db01", EntityKind::DataSet, "sessions-snap").unwrap();
        let sessions = graph.find("web01", EntityKind::DataSet, "sessions").unwrap();

        assert!(has_link(&graph, copy, users, LinkKind::Genesis));
        assert!(has_link(&graph, snap, sessions, LinkKind::Genesis));
        // α sets and the unresolvable "orphan" contribute nothing
        assert_eq!(graph.links_of(LinkKind::Genesis).count(), 2);
        assert_eq!(graph.links_of(LinkKind::Holds).count(), 5);
    }

    #[test]
    fn test_duplicate_hostname_last_wins() {
        let specs: Vec<ContainerSpec> = serde_json::from_str(
            r#"[{"hostname": "h1", "nick": "old"}, {"hostname": "h1", "nick": "new"}]"#,
        )
        .unwrap();
        let graph = normalize(&specs);

        assert_eq!(graph.nodes().len(), 2);
        assert_eq!(graph.container("h1"), Some(EntityId(1)));
    }

    #[test]
    fn test_empty_input() {
        let graph = normalize(&[]);
        assert!(graph.nodes().is_empty());
        assert!(graph.links().is_empty());
    }

    #[test]
    fn test_views() {
        let graph = normalize(&containers());

        let value = serde_json::to_value(graph.view()).unwrap();
        assert_eq!(value["nodes"][0]["kind"], "container");
        assert_eq!(value["nodes"][0]["radius"], 45.0);
        assert_eq!(value["links"][0]["kind"], "contains");
        assert!(value["links"][0].get("name").is_none());

        let dot = graph.to_dot();
        assert!(dot.starts_with("digraph \"entities\" {"));
        assert_eq!(dot.matches(" -> ").count(), graph.links().len());
    }
}
