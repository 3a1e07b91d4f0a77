//! Component command handlers

use anyhow::{bail, Context, Result};
use uuid::Uuid;

use partbin_core::{Component, ComponentPatch, LookupError, Store};

use crate::output::{short_id, Output};
use crate::prompt::confirm;

/// Field values given on the command line
#[derive(Debug, Default, Clone)]
pub struct Fields {
    pub name: Option<String>,
    pub part_number: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub package: Option<String>,
    pub parameters: Option<String>,
    pub stock: Option<u32>,
    pub datasheet: Option<String>,
}

impl Fields {
    fn into_patch(self) -> ComponentPatch {
        ComponentPatch {
            name: self.name,
            category: self.category,
            part_number: self.part_number,
            location: self.location,
            package: self.package,
            parameters: self.parameters,
            stock: self.stock,
            datasheet: self.datasheet,
        }
    }
}

/// List components, optionally filtered
pub fn list(store: &Store, search: Option<String>, low_stock: bool, output: &Output) -> Result<()> {
    let mut components = store.search(search.as_deref().unwrap_or(""));
    if low_stock {
        components.retain(|c| c.is_low_stock());
    }

    output.print_components(&components);
    Ok(())
}

/// Show a single component
pub fn show(store: &Store, id: String, output: &Output) -> Result<()> {
    let id = parse_component_id(&id, store)?;
    let component = store
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("Component not found: {}", id))?;

    output.print_component(component);
    Ok(())
}

/// Create a new component
pub fn add(
    store: &mut Store,
    name: String,
    part_number: String,
    fields: Fields,
    output: &Output,
) -> Result<()> {
    let name = name.trim().to_string();
    let part_number = part_number.trim().to_string();
    if name.is_empty() || part_number.is_empty() {
        bail!("Name and part number are required.");
    }

    let mut component = Component::new(name, part_number);
    fields.into_patch().apply(&mut component);

    store
        .add(component.clone())
        .context("Failed to add component")?;

    output.success(&format!("Added component: {}", component.id));
    output.print_component(&component);
    Ok(())
}

/// Edit fields of a component
pub fn edit(store: &mut Store, id: String, fields: Fields, output: &Output) -> Result<()> {
    let id = parse_component_id(&id, store)?;
    let patch = fields.into_patch();
    if patch.is_empty() {
        bail!("Nothing to change. Pass at least one field, e.g. --stock 10");
    }
    if matches!(patch.name.as_deref(), Some(n) if n.trim().is_empty())
        || matches!(patch.part_number.as_deref(), Some(p) if p.trim().is_empty())
    {
        bail!("Name and part number cannot be empty.");
    }

    let updated = store
        .edit(id, patch)
        .context("Failed to update component")?;

    output.success("Component updated");
    output.print_component(&updated);
    Ok(())
}

/// Delete a component
pub fn delete(store: &mut Store, id: String, yes: bool, output: &Output) -> Result<()> {
    let id = parse_component_id(&id, store)?;
    let component = store
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("Component not found: {}", id))?;

    if !yes && output.should_prompt() {
        println!(
            "Delete component: {} - {}",
            short_id(component),
            component.natural_key()
        );
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.delete(id).context("Failed to delete component")?;

    output.success(&format!("Deleted component: {}", id));
    Ok(())
}

/// Parse a component ID (supports full UUID or prefix)
fn parse_component_id(id: &str, store: &Store) -> Result<Uuid> {
    match store.resolve(id) {
        Ok(component) => Ok(component.id),
        Err(LookupError::NotFound(_)) => bail!("No component found matching: {}", id),
        Err(LookupError::Ambiguous { prefix, .. }) => {
            eprintln!("Multiple components match '{}':", id);
            for component in store
                .components()
                .iter()
                .filter(|c| c.id.to_string().starts_with(&prefix))
            {
                eprintln!("  {} - {}", component.id, component.natural_key());
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}
