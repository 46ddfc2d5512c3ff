//! Rendering of class decompositions into declaration and definition text.
//!
//! The emitter never decides anything about the algebra. It walks the terms the recurrence
//! engine produced and spells each read according to where the dependency lives: the base
//! primitive for (S,S), a named field for register-resident classes, the store otherwise.

use super::naming::{self, Signature};
use crate::error::GenError;
use crate::generator::EmitOptions;
use crate::recurrence::{ClassDecomposition, Decomposition, DecompositionTerm, Factor, TermKind};
use crate::storage::{StorageLayout, StorageStrategy};
use crate::types::{Center, ShellPair};
use std::fmt::Write;
use tracing::debug;

const INDENT: &str = "  ";
const ROW_INDENT: &str = "    ";

/// Renders generated classes into a declarations sink and a definitions sink.
pub struct CodeEmitter<'a> {
    layout: &'a StorageLayout,
    options: &'a EmitOptions,
}

impl<'a> CodeEmitter<'a> {
    pub fn new(layout: &'a StorageLayout, options: &'a EmitOptions) -> Self {
        Self { layout, options }
    }

    /// Writes the `#ifndef`-guarded store macros every generated class relies on.
    ///
    /// `LOCSTOREFULL` expands to the same arithmetic as [`crate::storage::store_address`].
    pub fn emit_prelude(&self, store_dim: usize, declarations: &mut String) -> Result<(), GenError> {
        writeln!(declarations, "#ifndef STOREDIM")?;
        writeln!(declarations, "#define STOREDIM {}", store_dim)?;
        writeln!(declarations, "#endif")?;
        writeln!(declarations, "#ifndef LOCSTORE")?;
        writeln!(
            declarations,
            "#define LOCSTORE(A,i1,i2,d1,d2) A[(i2)*(d1)+(i1)]"
        )?;
        writeln!(declarations, "#endif")?;
        writeln!(declarations, "#ifndef LOCSTOREFULL")?;
        writeln!(
            declarations,
            "#define LOCSTOREFULL(A,i1,i2,d1,d2,m) A[((m)*(d2)+(i2))*(d1)+(i1)]"
        )?;
        writeln!(declarations, "#endif")?;
        Ok(())
    }

    /// Emits the class of `class.pair` at order `class.m` under its configured strategy.
    ///
    /// # Errors
    ///
    /// Returns `GenError::InvalidConfig` if the layout holds no strategy for the pair, or if a
    /// partial-register class meets a row whose raise dependency is the base case.
    pub fn emit_class(
        &self,
        class: &ClassDecomposition,
        declarations: &mut String,
        definitions: &mut String,
    ) -> Result<(), GenError> {
        let strategy = self.layout.strategy(class.pair).ok_or_else(|| {
            GenError::InvalidConfig(format!("no storage strategy selected for {}", class.pair))
        })?;
        let name = naming::class_name(class.pair, class.m);
        let title = class_title(class.pair, class.m);
        debug!(class = %name, %strategy, "emitting class");

        let fields: &[Decomposition] = if strategy.keeps_named_values() {
            &class.components
        } else {
            &[]
        };
        self.write_declaration(declarations, &title, &name, class.pair, fields)?;

        self.write_definition_head(definitions, &title, &name, class.pair)?;
        match strategy {
            StorageStrategy::FullRegister => {
                self.write_instantiations(definitions, INDENT, &class.components, None, class.m)?;
                for d in &class.components {
                    let target = naming::field_name(d.target.global_bra(), d.target.global_ket());
                    self.write_assignment(definitions, INDENT, &target, d, None)?;
                }
            }
            StorageStrategy::GlobalStore => {
                self.write_instantiations(definitions, INDENT, &class.components, None, class.m)?;
                writeln!(definitions, "{}{} val;", INDENT, self.options.scalar)?;
                for d in &class.components {
                    self.write_store(definitions, INDENT, d, None)?;
                }
            }
            StorageStrategy::PartialRegister => self.write_partial_body(definitions, class)?,
        }
        writeln!(definitions, "}}")?;
        Ok(())
    }

    /// Emits the row-partial class holding bra row `row` of `class.pair` as named fields.
    pub fn emit_row_class(
        &self,
        class: &ClassDecomposition,
        row: usize,
        declarations: &mut String,
        definitions: &mut String,
    ) -> Result<(), GenError> {
        let components = class.row(row);
        let name = naming::row_class_name(class.pair, class.m, row);
        let title = format!(
            "{} row {} partial integral, m={}",
            class.pair.label(),
            row + 1,
            class.m
        );
        debug!(class = %name, "emitting row-partial class");

        self.write_declaration(declarations, &title, &name, class.pair, components)?;
        self.write_definition_head(definitions, &title, &name, class.pair)?;
        self.write_instantiations(definitions, INDENT, components, None, class.m)?;
        for d in components {
            let target = naming::field_name(d.target.global_bra(), d.target.global_ket());
            self.write_assignment(definitions, INDENT, &target, d, None)?;
        }
        writeln!(definitions, "}}")?;
        Ok(())
    }

    fn write_declaration(
        &self,
        out: &mut String,
        title: &str,
        name: &str,
        pair: ShellPair,
        fields: &[Decomposition],
    ) -> Result<(), GenError> {
        writeln!(out)?;
        writeln!(out, "/* {} */", title)?;
        writeln!(out, "class {}{{", name)?;
        writeln!(out, "public:")?;
        for d in fields {
            writeln!(
                out,
                "{}{} {}; // {}",
                INDENT,
                self.options.scalar,
                naming::field_name(d.target.global_bra(), d.target.global_ket()),
                naming::component_comment(pair, d.target.bra, d.target.ket)
            )?;
        }
        writeln!(
            out,
            "{}{}{}({});",
            INDENT,
            self.options.qualifier_prefix(),
            name,
            Signature::for_pair(pair).parameters(&self.options.scalar)
        )?;
        writeln!(out, "}};")?;
        Ok(())
    }

    fn write_definition_head(
        &self,
        out: &mut String,
        title: &str,
        name: &str,
        pair: ShellPair,
    ) -> Result<(), GenError> {
        writeln!(out)?;
        writeln!(out, "/* {} */", title)?;
        writeln!(
            out,
            "{}{}::{}({}){{",
            self.options.qualifier_prefix(),
            name,
            name,
            Signature::for_pair(pair).parameters(&self.options.scalar)
        )?;
        Ok(())
    }

    fn write_partial_body(
        &self,
        out: &mut String,
        class: &ClassDecomposition,
    ) -> Result<(), GenError> {
        let raise_pair = class
            .components
            .first()
            .and_then(|d| d.term(TermKind::Raise))
            .map(|t| t.dependency.pair)
            .ok_or(GenError::InvalidBaseCase)?;
        if raise_pair.is_base() {
            return Err(GenError::InvalidConfig(format!(
                "partial register storage of {} needs a non-base raise dependency",
                class.pair
            )));
        }

        self.write_instantiations(out, INDENT, &class.components, Some(raise_pair), class.m)?;
        for row in 0..class.pair.bra.component_count() {
            let components = class.row(row);
            // Raising either side keeps every raise dependency of a bra row in one dependency row.
            let dependency_row = components
                .first()
                .and_then(|d| d.term(TermKind::Raise))
                .map(|t| t.dependency.bra)
                .ok_or(GenError::InvalidBaseCase)?;

            writeln!(out, "{}{{", INDENT)?;
            for order in [class.m, class.m + 1] {
                writeln!(
                    out,
                    "{}{} {}({}); // construct {} row {} for m={}",
                    ROW_INDENT,
                    naming::row_class_name(raise_pair, order, dependency_row),
                    naming::object_name(raise_pair, order),
                    Signature::for_pair(raise_pair).arguments(),
                    naming::pair_tag(raise_pair),
                    dependency_row + 1,
                    order
                )?;
            }
            writeln!(out)?;
            writeln!(out, "{}{} val;", ROW_INDENT, self.options.scalar)?;
            for d in components {
                self.write_store(out, ROW_INDENT, d, Some(raise_pair))?;
            }
            writeln!(out, "{}}}", INDENT)?;
        }
        Ok(())
    }

    /// Constructs every non-base dependency of `components` at orders `m` and `m + 1`.
    ///
    /// `skip` names a pair instantiated elsewhere (the row-scoped raise dependency).
    fn write_instantiations(
        &self,
        out: &mut String,
        indent: &str,
        components: &[Decomposition],
        skip: Option<ShellPair>,
        m: u32,
    ) -> Result<(), GenError> {
        let dependencies = instantiated_dependencies(components, skip);
        if dependencies.is_empty() {
            return Ok(());
        }
        writeln!(out)?;
        for order in [m, m + 1] {
            for &pair in &dependencies {
                writeln!(
                    out,
                    "{}{} {}({}); // construct {} for m={}",
                    indent,
                    naming::class_name(pair, order),
                    naming::object_name(pair, order),
                    Signature::for_pair(pair).arguments(),
                    naming::pair_tag(pair),
                    order
                )?;
            }
        }
        writeln!(out)?;
        Ok(())
    }

    fn write_assignment(
        &self,
        out: &mut String,
        indent: &str,
        target: &str,
        d: &Decomposition,
        row_scoped: Option<ShellPair>,
    ) -> Result<(), GenError> {
        for (i, term) in d.terms.iter().enumerate() {
            let op = if i == 0 { "=" } else { "+=" };
            writeln!(
                out,
                "{}{} {} {};",
                indent,
                target,
                op,
                self.term_expression(term, d.m, row_scoped)
            )?;
        }
        Ok(())
    }

    fn write_store(
        &self,
        out: &mut String,
        indent: &str,
        d: &Decomposition,
        row_scoped: Option<ShellPair>,
    ) -> Result<(), GenError> {
        self.write_assignment(out, indent, "val", d, row_scoped)?;
        writeln!(
            out,
            "{}{} = val;",
            indent,
            naming::store_full(d.target.global_bra(), d.target.global_ket(), d.m)
        )?;
        Ok(())
    }

    /// The right-hand side contributed by one term at target order `m`.
    pub fn term_expression(
        &self,
        term: &DecompositionTerm,
        m: u32,
        row_scoped: Option<ShellPair>,
    ) -> String {
        let current = self.read(term, m, row_scoped);
        let next = self.read(term, m + 1, row_scoped);
        match term.factor {
            Factor::Displacement { center, axis } => format!(
                "{} * {} - {} * {}",
                center.displacement(axis),
                current,
                Center::C.displacement(axis),
                next
            ),
            Factor::InverseTwoZeta { multiplier } => format!(
                "TwoZetaInv * {:.6} * ({} - {})",
                f64::from(multiplier),
                current,
                next
            ),
        }
    }

    fn read(&self, term: &DecompositionTerm, m: u32, row_scoped: Option<ShellPair>) -> String {
        let dep = term.dependency;
        if dep.is_base() {
            return naming::base_read(m);
        }
        if row_scoped == Some(dep.pair) || self.layout.keeps_named_values(dep.pair) {
            format!(
                "{}.{}",
                naming::object_name(dep.pair, m),
                naming::field_name(dep.global_bra(), dep.global_ket())
            )
        } else {
            naming::store_full(dep.global_bra(), dep.global_ket(), m)
        }
    }
}

fn class_title(pair: ShellPair, m: u32) -> String {
    let kind = if m == 0 { "true" } else { "auxiliary" };
    format!("{} {} integral, m={}", pair.label(), kind, m)
}

/// Non-base dependency pairs of `components`, ordered raise, second lowering, cross.
fn instantiated_dependencies(components: &[Decomposition], skip: Option<ShellPair>) -> Vec<ShellPair> {
    let mut pairs = Vec::new();
    for kind in [TermKind::Raise, TermKind::SecondLowering, TermKind::Cross] {
        for term in components.iter().flat_map(|d| d.terms.iter()) {
            let pair = term.dependency.pair;
            if term.kind == kind && !pair.is_base() && Some(pair) != skip && !pairs.contains(&pair) {
                pairs.push(pair);
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::RecurrenceEngine;
    use crate::types::Shell;

    fn pair(bra: Shell, ket: Shell) -> ShellPair {
        ShellPair::new(bra, ket)
    }

    fn layout(entries: &[(ShellPair, StorageStrategy)]) -> StorageLayout {
        let mut layout = StorageLayout::new();
        for &(pair, strategy) in entries {
            layout.insert(pair, strategy);
        }
        layout
    }

    fn render(layout: &StorageLayout, target: ShellPair, m: u32) -> (String, String) {
        let options = EmitOptions::default();
        let emitter = CodeEmitter::new(layout, &options);
        let mut engine = RecurrenceEngine::new();
        let class = engine.decompose_class(target, m).unwrap();
        let (mut decl, mut def) = (String::new(), String::new());
        emitter.emit_class(&class, &mut decl, &mut def).unwrap();
        (decl, def)
    }

    #[test]
    fn ps_full_register_class_reads_the_base_primitive() {
        let ps = pair(Shell::P, Shell::S);
        let (decl, def) = render(&layout(&[(ps, StorageStrategy::FullRegister)]), ps, 0);

        assert!(decl.contains("/* PS true integral, m=0 */"));
        assert!(decl.contains("class PSint_0{"));
        assert!(decl.contains("  QUICKDouble x_1_0; // Px, S"));
        assert!(def.contains("__device__ __inline__ PSint_0::PSint_0(QUICKDouble PAx"));
        assert!(def.contains("  x_1_0 = PAx * VY(0, 0, 0) - PCx * VY(0, 0, 1);"));
        assert!(!def.contains("construct"));
    }

    #[test]
    fn auxiliary_classes_are_titled_as_such() {
        let ps = pair(Shell::P, Shell::S);
        let (decl, def) = render(&layout(&[(ps, StorageStrategy::FullRegister)]), ps, 2);
        assert!(decl.contains("/* PS auxiliary integral, m=2 */"));
        assert!(def.contains("x_3_0 = PAz * VY(0, 0, 2) - PCz * VY(0, 0, 3);"));
    }

    #[test]
    fn ds_reads_named_ps_values_and_weights_second_lowering() {
        let ps = pair(Shell::P, Shell::S);
        let ds = pair(Shell::D, Shell::S);
        let l = layout(&[
            (ps, StorageStrategy::FullRegister),
            (ds, StorageStrategy::FullRegister),
        ]);
        let (_, def) = render(&l, ds, 0);

        assert!(def.contains("  PSint_0 ps_0(PAx, PAy, PAz, PCx, PCy, PCz, store, YVerticalTemp); // construct [p|s] for m=0"));
        assert!(def.contains("  PSint_1 ps_1("));
        // Dxx is global index 7.
        assert!(def.contains("  x_7_0 = PAx * ps_0.x_1_0 - PCx * ps_1.x_1_0;"));
        assert!(def.contains("  x_7_0 += TwoZetaInv * 1.000000 * (VY(0, 0, 0) - VY(0, 0, 1));"));
    }

    #[test]
    fn global_store_routes_writes_and_store_resident_reads_through_macros() {
        let ps = pair(Shell::P, Shell::S);
        let ds = pair(Shell::D, Shell::S);
        let l = layout(&[
            (ps, StorageStrategy::GlobalStore),
            (ds, StorageStrategy::GlobalStore),
        ]);
        let (decl, def) = render(&l, ds, 1);

        assert!(!decl.contains("x_7_0;"));
        assert!(def.contains("  QUICKDouble val;"));
        assert!(def.contains(
            "  val = PAx * LOCSTOREFULL(store, 1, 0, STOREDIM, STOREDIM, 1) - PCx * LOCSTOREFULL(store, 1, 0, STOREDIM, STOREDIM, 2);"
        ));
        assert!(def.contains("  LOCSTOREFULL(store, 7, 0, STOREDIM, STOREDIM, 1) = val;"));
    }

    #[test]
    fn partial_register_instantiates_row_classes_per_bra_row() {
        let dp = pair(Shell::D, Shell::P);
        let dd = pair(Shell::D, Shell::D);
        let mut l = layout(&[
            (pair(Shell::D, Shell::S), StorageStrategy::FullRegister),
            (pair(Shell::P, Shell::P), StorageStrategy::FullRegister),
            (dp, StorageStrategy::FullRegister),
            (dd, StorageStrategy::PartialRegister),
        ]);
        l.mark_row_partial(dp);
        let (_, def) = render(&l, dd, 0);

        assert_eq!(def.matches("  {\n").count(), 6);
        assert!(def.contains("    DPint_0_1 dp_0("));
        assert!(def.contains("    DPint_1_6 dp_1("));
        assert!(!def.contains("  DPint_0 dp_0("));
        assert!(def.contains("  PPint_0 pp_0("));
        assert!(def.contains("  DSint_1 ds_1("));
        // Dxy against Dxy raises the ket along x and reads [Dxy|Py] from row 1 of [D|P].
        assert!(def.contains("    val = PBx * dp_0.x_4_2 - PCx * dp_1.x_4_2;"));
        assert!(def.contains("    val += TwoZetaInv * 1.000000 * (pp_0.x_2_2 - pp_1.x_2_2);"));
    }

    #[test]
    fn row_class_holds_only_one_row() {
        let options = EmitOptions::default();
        let dp = pair(Shell::D, Shell::P);
        let l = layout(&[
            (pair(Shell::D, Shell::S), StorageStrategy::FullRegister),
            (pair(Shell::P, Shell::S), StorageStrategy::FullRegister),
            (dp, StorageStrategy::GlobalStore),
        ]);
        let emitter = CodeEmitter::new(&l, &options);
        let class = RecurrenceEngine::new().decompose_class(dp, 0).unwrap();
        let (mut decl, mut def) = (String::new(), String::new());
        emitter.emit_row_class(&class, 2, &mut decl, &mut def).unwrap();

        assert!(decl.contains("class DPint_0_3{"));
        assert_eq!(decl.matches("QUICKDouble x_").count(), 3);
        assert!(decl.contains("QUICKDouble x_6_1; // Dxz, Px"));
        assert!(def.contains("  x_6_1 = PBx * ds_0.x_6_0 - PCx * ds_1.x_6_0;"));
    }

    #[test]
    fn missing_strategy_is_a_configuration_error() {
        let options = EmitOptions::default();
        let l = StorageLayout::new();
        let emitter = CodeEmitter::new(&l, &options);
        let class = RecurrenceEngine::new()
            .decompose_class(pair(Shell::P, Shell::S), 0)
            .unwrap();
        let result = emitter.emit_class(&class, &mut String::new(), &mut String::new());
        assert!(matches!(result, Err(GenError::InvalidConfig(_))));
    }

    #[test]
    fn prelude_matches_store_addressing() {
        let options = EmitOptions::default();
        let l = StorageLayout::new();
        let mut decl = String::new();
        CodeEmitter::new(&l, &options).emit_prelude(35, &mut decl).unwrap();
        assert!(decl.starts_with("#ifndef STOREDIM\n#define STOREDIM 35\n#endif\n"));
        assert!(decl.contains("#define LOCSTOREFULL(A,i1,i2,d1,d2,m) A[((m)*(d2)+(i2))*(d1)+(i1)]"));
    }
}
