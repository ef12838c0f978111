//! Discovery of swappable fragment shading functions.
//!
//! A fragment module may declare several `@fragment` entry points that share
//! one input interface. Any of them can be paired with the common vertex stage,
//! so they behave like implementations of a single subroutine slot: the slot
//! is named after the interface type, and its compatible subroutines are the
//! entry points that accept it.
//!
//! The registry walks the parsed module once, after linking, and flattens every
//! slot into a [`SubroutineTable`]. Keys 1-9 index into that table.

use std::fmt;

/// GPU limits reported alongside the discovery report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverLimits {
    pub max_bind_groups: u32,
    pub max_uniform_buffer_binding_size: u32,
}

impl DriverLimits {
    pub fn from_limits(limits: &wgpu::Limits) -> Self {
        Self {
            max_bind_groups: limits.max_bind_groups,
            max_uniform_buffer_binding_size: limits.max_uniform_buffer_binding_size,
        }
    }
}

/// One dispatch slot and the implementations compatible with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubroutineUniform {
    pub index: usize,
    pub name: String,
    pub compatible: Vec<String>,
}

/// Ordered subroutine names, in discovery order. Built once, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubroutineTable {
    names: Vec<String>,
}

impl SubroutineTable {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl fmt::Display for SubroutineTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.names.join(", "))
    }
}

#[derive(Debug, Clone)]
pub struct SubroutineRegistry {
    pub limits: DriverLimits,
    pub uniforms: Vec<SubroutineUniform>,
    pub table: SubroutineTable,
}

impl SubroutineRegistry {
    /// Introspect a validated fragment module.
    pub fn discover(module: &naga::Module, limits: DriverLimits) -> Self {
        let mut uniforms: Vec<SubroutineUniform> = Vec::new();

        for entry in module
            .entry_points
            .iter()
            .filter(|ep| ep.stage == naga::ShaderStage::Fragment)
        {
            let slot = interface_name(module, &entry.function);
            match uniforms.iter_mut().find(|u| u.name == slot) {
                Some(uniform) => uniform.compatible.push(entry.name.clone()),
                None => uniforms.push(SubroutineUniform {
                    index: uniforms.len(),
                    name: slot,
                    compatible: vec![entry.name.clone()],
                }),
            }
        }

        // Slots are concatenated; with more than one slot the indices of
        // different slots share one key space.
        let table = SubroutineTable::new(
            uniforms
                .iter()
                .flat_map(|u| u.compatible.iter().cloned())
                .collect(),
        );

        Self { limits, uniforms, table }
    }

    pub fn uniform_count(&self) -> usize {
        self.uniforms.len()
    }

    /// Human-readable discovery report, one entry per line.
    pub fn report(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "Max bind groups: {} - Max uniform buffer binding size: {}",
            self.limits.max_bind_groups, self.limits.max_uniform_buffer_binding_size
        )];
        lines.push(format!("Subroutine uniforms: {}", self.uniform_count()));
        let mut offset = 0;
        for uniform in &self.uniforms {
            lines.push(format!("Subroutine Uniform: {} - name: {}", uniform.index, uniform.name));
            lines.push("Compatible Subroutines:".to_string());
            for name in &uniform.compatible {
                lines.push(format!("\t{offset} - {name}"));
                offset += 1;
            }
        }
        lines
    }

    pub fn log_report(&self) {
        for line in self.report() {
            tracing::info!("{line}");
        }
        tracing::debug!("Subroutine table: {}", self.table);
        if self.table.is_empty() {
            tracing::warn!("no fragment subroutines found, shading selection is disabled");
        }
    }
}

/// Name of the interface a fragment entry point accepts: the type of its
/// first argument, or `builtin` when it takes nothing user-defined.
fn interface_name(module: &naga::Module, function: &naga::Function) -> String {
    function
        .arguments
        .first()
        .and_then(|arg| module.types[arg.ty].name.clone())
        .unwrap_or_else(|| "builtin".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: DriverLimits = DriverLimits {
        max_bind_groups: 4,
        max_uniform_buffer_binding_size: 65536,
    };

    fn discover(source: &str) -> SubroutineRegistry {
        let module = naga::front::wgsl::parse_str(source).expect("test shader failed to parse");
        SubroutineRegistry::discover(&module, LIMITS)
    }

    #[test]
    fn shipped_shader_exposes_four_models() {
        let registry = discover(include_str!("../../assets/shaders/illumination_models.frag.wgsl"));
        assert_eq!(registry.uniform_count(), 1);
        assert_eq!(registry.uniforms[0].name, "VertexOutput");
        let names: Vec<_> = registry.table.iter().collect();
        assert_eq!(names, ["Lambert", "Phong", "BlinnPhong", "GGX"]);
    }

    #[test]
    fn vertex_entry_points_are_not_subroutines() {
        let registry = discover(include_str!("../../assets/shaders/illumination_models.vert.wgsl"));
        assert_eq!(registry.uniform_count(), 0);
        assert!(registry.table.is_empty());
        assert_eq!(registry.table.get(0), None);
    }

    #[test]
    fn distinct_interfaces_are_concatenated() {
        let registry = discover(
            r#"
            struct A { @location(0) c: vec3<f32> };
            struct B { @location(0) c: vec4<f32> };
            @fragment fn a_one(in: A) -> @location(0) vec4<f32> { return vec4<f32>(in.c, 1.0); }
            @fragment fn b_one(in: B) -> @location(0) vec4<f32> { return in.c; }
            @fragment fn a_two(in: A) -> @location(0) vec4<f32> { return vec4<f32>(in.c, 0.5); }
            "#,
        );
        assert_eq!(registry.uniform_count(), 2);
        assert_eq!(registry.uniforms[0].compatible, ["a_one", "a_two"]);
        assert_eq!(registry.uniforms[1].compatible, ["b_one"]);
        assert_eq!(registry.table.iter().collect::<Vec<_>>(), ["a_one", "a_two", "b_one"]);
    }

    #[test]
    fn report_lists_every_subroutine() {
        let registry = discover(include_str!("../../assets/shaders/illumination_models.frag.wgsl"));
        let report = registry.report();
        assert_eq!(report[0], "Max bind groups: 4 - Max uniform buffer binding size: 65536");
        assert!(report.contains(&"Subroutine Uniform: 0 - name: VertexOutput".to_string()));
        assert!(report.contains(&"\t3 - GGX".to_string()));
    }

    #[test]
    fn table_lookup() {
        let table = SubroutineTable::new(vec!["Lambert".into(), "Phong".into()]);
        assert_eq!(table.get(1), Some("Phong"));
        assert_eq!(table.get(2), None);
        assert_eq!(table.to_string(), "[Lambert, Phong]");
    }
}
