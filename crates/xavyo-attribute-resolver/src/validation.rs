//! Static validation of the plugin graph
//!
//! Runs once when a resolver is built. Request-time resolution assumes the
//! graph is acyclic and every dependency exists.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::error::ResolverConfigError;
use crate::plugin::{AttributeDefinition, DataConnector};
use crate::settings::PluginDependencies;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Node<'a> {
    Definition(&'a str),
    Connector(&'a str),
}

impl Node<'_> {
    fn id(&self) -> &str {
        match self {
            Node::Definition(id) | Node::Connector(id) => id,
        }
    }
}

struct Graph<'a> {
    definitions: &'a BTreeMap<String, Arc<dyn AttributeDefinition>>,
    connectors: &'a BTreeMap<String, Arc<dyn DataConnector>>,
}

impl<'a> Graph<'a> {
    fn edges(&self, node: Node<'a>) -> Vec<Node<'a>> {
        let mut edges = Vec::new();
        let dependencies: &PluginDependencies = match node {
            Node::Definition(id) => match self.definitions.get(id) {
                Some(d) => &d.settings().dependencies,
                None => return edges,
            },
            Node::Connector(id) => match self.connectors.get(id) {
                Some(c) => {
                    if let Some(failover) = &c.settings().failover_connector_id {
                        edges.push(Node::Connector(failover.as_str()));
                    }
                    &c.settings().dependencies
                }
                None => return edges,
            },
        };

        edges.extend(dependencies.attributes.iter().map(|d| Node::Definition(d)));
        edges.extend(dependencies.connector_ids().map(Node::Connector));
        edges
    }

    fn visit(
        &self,
        node: Node<'a>,
        stack: &mut Vec<Node<'a>>,
        done: &mut HashSet<Node<'a>>,
    ) -> Result<(), ResolverConfigError> {
        if done.contains(&node) {
            return Ok(());
        }
        if let Some(start) = stack.iter().position(|n| *n == node) {
            let mut path: Vec<String> = stack[start..].iter().map(|n| n.id().to_string()).collect();
            path.push(node.id().to_string());
            return Err(ResolverConfigError::CircularDependency { path });
        }

        stack.push(node);
        for next in self.edges(node) {
            self.visit(next, stack, done)?;
        }
        stack.pop();
        done.insert(node);
        Ok(())
    }
}

/// Check a plugin graph for unknown references and cycles.
pub fn validate_graph(
    definitions: &BTreeMap<String, Arc<dyn AttributeDefinition>>,
    connectors: &BTreeMap<String, Arc<dyn DataConnector>>,
) -> Result<(), ResolverConfigError> {
    if let Some(id) = definitions.keys().find(|id| connectors.contains_key(*id)) {
        return Err(ResolverConfigError::IdCollision { id: id.clone() });
    }

    let check = |plugin_id: &str, deps: &PluginDependencies| -> Result<(), ResolverConfigError> {
        let missing = deps
            .attributes
            .iter()
            .map(String::as_str)
            .find(|d| !definitions.contains_key(*d))
            .or_else(|| deps.connector_ids().find(|c| !connectors.contains_key(*c)));
        match missing {
            Some(dependency_id) => Err(ResolverConfigError::MissingDependency {
                plugin_id: plugin_id.to_string(),
                dependency_id: dependency_id.to_string(),
            }),
            None => Ok(()),
        }
    };

    for (id, definition) in definitions {
        check(id, &definition.settings().dependencies)?;
    }
    for (id, connector) in connectors {
        check(id, &connector.settings().dependencies)?;
    }

    validate_failover(connectors)?;

    let graph = Graph {
        definitions,
        connectors,
    };
    let mut done = HashSet::new();
    let mut stack = Vec::new();
    for id in definitions.keys() {
        graph.visit(Node::Definition(id), &mut stack, &mut done)?;
    }
    for id in connectors.keys() {
        graph.visit(Node::Connector(id), &mut stack, &mut done)?;
    }

    Ok(())
}

fn validate_failover(
    connectors: &BTreeMap<String, Arc<dyn DataConnector>>,
) -> Result<(), ResolverConfigError> {
    for (id, connector) in connectors {
        let mut path = vec![id.clone()];
        let mut next = connector.settings().failover_connector_id.clone();

        while let Some(failover_id) = next {
            let Some(failover) = connectors.get(&failover_id) else {
                return Err(ResolverConfigError::UnknownFailover {
                    connector_id: path.last().cloned().unwrap_or_default(),
                    failover_id,
                });
            };
            if path.contains(&failover_id) {
                path.push(failover_id);
                return Err(ResolverConfigError::FailoverLoop { path });
            }
            path.push(failover_id);
            next = failover.settings().failover_connector_id.clone();
        }
    }
    Ok(())
}
