//! Tree construction.
//!
//! `TreeBuilder` is the only way nodes enter an arena. Every constructor
//! takes the already-built children, so parent links are wired at
//! creation and the finished tree is immutable. The excluded front end
//! drives this builder from parse events; tests drive it directly.

use sable_common::TextSpan;
use smallvec::SmallVec;

use crate::arena::*;
use crate::kinds::syntax_kind as k;

#[derive(Debug, Default)]
pub struct TreeBuilder {
    arena: NodeArena,
}

impl TreeBuilder {
    pub fn new() -> TreeBuilder {
        TreeBuilder {
            arena: NodeArena::new(),
        }
    }

    /// Finish the tree, fixing `root` as the arena root.
    pub fn finish(mut self, root: NodeIndex) -> NodeArena {
        self.arena.set_root(root);
        self.arena
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    fn add(&mut self, kind: u16, span: TextSpan, data: NodeData) -> NodeIndex {
        self.arena.push(
            Node {
                kind,
                span,
                full_span: span,
            },
            data,
        )
    }

    fn adopt(&mut self, parent: NodeIndex, children: &[NodeIndex]) {
        for &child in children {
            if child.is_some() {
                self.arena.set_parent(child, parent);
            }
        }
    }

    fn adopt_list(&mut self, parent: NodeIndex, list: &NodeList) {
        for child in list.iter() {
            self.arena.set_parent(child, parent);
        }
    }

    // =========================================================================
    // Top-level structure
    // =========================================================================

    pub fn compilation_unit(
        &mut self,
        span: TextSpan,
        externs: NodeList,
        usings: NodeList,
        members: NodeList,
    ) -> NodeIndex {
        let mut children: SmallVec<[NodeIndex; 8]> = SmallVec::new();
        children.extend(externs.iter());
        children.extend(usings.iter());
        children.extend(members.iter());
        let idx = self.add(
            k::COMPILATION_UNIT,
            span,
            NodeData::CompilationUnit(CompilationUnitData {
                externs,
                usings,
                members,
            }),
        );
        self.adopt(idx, &children);
        idx
    }

    pub fn namespace(
        &mut self,
        span: TextSpan,
        file_scoped: bool,
        name: impl Into<String>,
        name_span: TextSpan,
        externs: NodeList,
        usings: NodeList,
        members: NodeList,
    ) -> NodeIndex {
        let kind = if file_scoped {
            k::FILE_SCOPED_NAMESPACE_DECLARATION
        } else {
            k::NAMESPACE_DECLARATION
        };
        let mut children: SmallVec<[NodeIndex; 8]> = SmallVec::new();
        children.extend(externs.iter());
        children.extend(usings.iter());
        children.extend(members.iter());
        let idx = self.add(
            kind,
            span,
            NodeData::Namespace(NamespaceDeclData {
                name: name.into(),
                name_span,
                externs,
                usings,
                members,
            }),
        );
        self.adopt(idx, &children);
        idx
    }

    pub fn using_directive(
        &mut self,
        span: TextSpan,
        alias: Option<String>,
        target: impl Into<String>,
    ) -> NodeIndex {
        self.add(
            k::USING_DIRECTIVE,
            span,
            NodeData::UsingDirective(UsingDirectiveData {
                alias,
                target: target.into(),
            }),
        )
    }

    pub fn extern_alias(&mut self, span: TextSpan, name: impl Into<String>) -> NodeIndex {
        self.add(
            k::EXTERN_ALIAS_DIRECTIVE,
            span,
            NodeData::ExternAlias(ExternAliasData { name: name.into() }),
        )
    }

    pub fn global_statement(&mut self, span: TextSpan, statement: NodeIndex) -> NodeIndex {
        let idx = self.add(
            k::GLOBAL_STATEMENT,
            span,
            NodeData::GlobalStatement(GlobalStatementData { statement }),
        );
        self.adopt(idx, &[statement]);
        idx
    }

    // =========================================================================
    // Type and member declarations
    // =========================================================================

    pub fn type_decl(
        &mut self,
        kind: u16,
        span: TextSpan,
        name: impl Into<String>,
        name_span: TextSpan,
        type_parameters: NodeList,
        base_list: NodeIndex,
        members: NodeList,
        attribute_lists: NodeList,
        modifiers: u32,
    ) -> NodeIndex {
        debug_assert!(crate::kinds::is_type_declaration(kind));
        let mut children: SmallVec<[NodeIndex; 8]> = SmallVec::new();
        children.extend(type_parameters.iter());
        children.push(base_list);
        children.extend(members.iter());
        children.extend(attribute_lists.iter());
        let idx = self.add(
            kind,
            span,
            NodeData::TypeDecl(TypeDeclData {
                name: name.into(),
                name_span,
                type_parameters,
                base_list,
                members,
                attribute_lists,
                modifiers,
            }),
        );
        self.adopt(idx, &children);
        idx
    }

    pub fn base_list(&mut self, span: TextSpan, types: NodeList) -> NodeIndex {
        let idx = self.add(
            k::BASE_LIST,
            span,
            NodeData::BaseList(BaseListData {
                types: types.clone(),
            }),
        );
        self.adopt_list(idx, &types);
        idx
    }

    pub fn method(
        &mut self,
        span: TextSpan,
        name: impl Into<String>,
        name_span: TextSpan,
        type_parameters: NodeList,
        parameter_list: NodeIndex,
        return_type: NodeIndex,
        body: NodeIndex,
        expression_body: NodeIndex,
        modifiers: u32,
    ) -> NodeIndex {
        let mut children: SmallVec<[NodeIndex; 8]> = SmallVec::new();
        children.extend(type_parameters.iter());
        children.push(parameter_list);
        children.push(return_type);
        children.push(body);
        children.push(expression_body);
        let idx = self.add(
            k::METHOD_DECLARATION,
            span,
            NodeData::Method(MethodDeclData {
                name: name.into(),
                name_span,
                type_parameters,
                parameter_list,
                return_type,
                body,
                expression_body,
                modifiers,
            }),
        );
        self.adopt(idx, &children);
        idx
    }

    pub fn constructor(
        &mut self,
        span: TextSpan,
        name: impl Into<String>,
        parameter_list: NodeIndex,
        body: NodeIndex,
        modifiers: u32,
    ) -> NodeIndex {
        let idx = self.add(
            k::CONSTRUCTOR_DECLARATION,
            span,
            NodeData::Constructor(ConstructorDeclData {
                name: name.into(),
                parameter_list,
                body,
                modifiers,
            }),
        );
        self.adopt(idx, &[parameter_list, body]);
        idx
    }

    pub fn operator_decl(
        &mut self,
        span: TextSpan,
        token: impl Into<String>,
        parameter_list: NodeIndex,
        return_type: NodeIndex,
        body: NodeIndex,
        modifiers: u32,
    ) -> NodeIndex {
        let idx = self.add(
            k::OPERATOR_DECLARATION,
            span,
            NodeData::Operator(OperatorDeclData {
                token: token.into(),
                parameter_list,
                return_type,
                body,
                modifiers,
            }),
        );
        self.adopt(idx, &[parameter_list, return_type, body]);
        idx
    }

    pub fn property(
        &mut self,
        span: TextSpan,
        name: impl Into<String>,
        name_span: TextSpan,
        ty: NodeIndex,
        accessors: NodeList,
        expression_body: NodeIndex,
        modifiers: u32,
    ) -> NodeIndex {
        let mut children: SmallVec<[NodeIndex; 4]> = SmallVec::new();
        children.push(ty);
        children.extend(accessors.iter());
        children.push(expression_body);
        let idx = self.add(
            k::PROPERTY_DECLARATION,
            span,
            NodeData::Property(PropertyDeclData {
                name: name.into(),
                name_span,
                ty,
                accessors,
                expression_body,
                modifiers,
            }),
        );
        self.adopt(idx, &children);
        idx
    }

    pub fn accessor(
        &mut self,
        span: TextSpan,
        accessor_kind: AccessorKind,
        body: NodeIndex,
        expression_body: NodeIndex,
    ) -> NodeIndex {
        let idx = self.add(
            k::ACCESSOR_DECLARATION,
            span,
            NodeData::Accessor(AccessorDeclData {
                accessor_kind,
                body,
                expression_body,
            }),
        );
        self.adopt(idx, &[body, expression_body]);
        idx
    }

    pub fn field(
        &mut self,
        span: TextSpan,
        name: impl Into<String>,
        name_span: TextSpan,
        ty: NodeIndex,
        initializer: NodeIndex,
        modifiers: u32,
    ) -> NodeIndex {
        let idx = self.add(
            k::FIELD_DECLARATION,
            span,
            NodeData::Field(FieldDeclData {
                name: name.into(),
                name_span,
                ty,
                initializer,
                modifiers,
            }),
        );
        self.adopt(idx, &[ty, initializer]);
        idx
    }

    pub fn parameter_list(&mut self, span: TextSpan, parameters: NodeList) -> NodeIndex {
        let idx = self.add(
            k::PARAMETER_LIST,
            span,
            NodeData::ParameterList(ParameterListData {
                parameters: parameters.clone(),
            }),
        );
        self.adopt_list(idx, &parameters);
        idx
    }

    pub fn parameter(
        &mut self,
        span: TextSpan,
        name: impl Into<String>,
        ty: NodeIndex,
        modifiers: u32,
        default_value: NodeIndex,
    ) -> NodeIndex {
        let idx = self.add(
            k::PARAMETER,
            span,
            NodeData::Parameter(ParameterData {
                name: name.into(),
                ty,
                modifiers,
                default_value,
            }),
        );
        self.adopt(idx, &[ty, default_value]);
        idx
    }

    pub fn type_parameter(&mut self, span: TextSpan, name: impl Into<String>) -> NodeIndex {
        self.add(
            k::TYPE_PARAMETER,
            span,
            NodeData::TypeParameter(TypeParameterData { name: name.into() }),
        )
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub fn block(&mut self, span: TextSpan, statements: NodeList) -> NodeIndex {
        let idx = self.add(
            k::BLOCK,
            span,
            NodeData::Block(BlockData {
                statements: statements.clone(),
            }),
        );
        self.adopt_list(idx, &statements);
        idx
    }

    pub fn local_decl(
        &mut self,
        span: TextSpan,
        name: impl Into<String>,
        ty: NodeIndex,
        initializer: NodeIndex,
        is_ref: bool,
        is_scoped: bool,
    ) -> NodeIndex {
        let idx = self.add(
            k::LOCAL_DECLARATION_STATEMENT,
            span,
            NodeData::LocalDecl(LocalDeclData {
                name: name.into(),
                ty,
                initializer,
                is_ref,
                is_scoped,
            }),
        );
        self.adopt(idx, &[ty, initializer]);
        idx
    }

    pub fn local_function(
        &mut self,
        span: TextSpan,
        name: impl Into<String>,
        parameter_list: NodeIndex,
        return_type: NodeIndex,
        body: NodeIndex,
    ) -> NodeIndex {
        let idx = self.add(
            k::LOCAL_FUNCTION_STATEMENT,
            span,
            NodeData::LocalFunction(LocalFunctionData {
                name: name.into(),
                parameter_list,
                return_type,
                body,
            }),
        );
        self.adopt(idx, &[parameter_list, return_type, body]);
        idx
    }

    pub fn expression_statement(&mut self, span: TextSpan, expression: NodeIndex) -> NodeIndex {
        let idx = self.add(
            k::EXPRESSION_STATEMENT,
            span,
            NodeData::ExpressionStatement(ExpressionStatementData { expression }),
        );
        self.adopt(idx, &[expression]);
        idx
    }

    pub fn return_statement(
        &mut self,
        span: TextSpan,
        expression: NodeIndex,
        is_ref: bool,
    ) -> NodeIndex {
        let idx = self.add(
            k::RETURN_STATEMENT,
            span,
            NodeData::Return(ReturnStatementData { expression, is_ref }),
        );
        self.adopt(idx, &[expression]);
        idx
    }

    pub fn checked_statement(
        &mut self,
        span: TextSpan,
        block: NodeIndex,
        is_checked: bool,
    ) -> NodeIndex {
        let kind = if is_checked {
            k::CHECKED_STATEMENT
        } else {
            k::UNCHECKED_STATEMENT
        };
        let idx = self.add(
            kind,
            span,
            NodeData::CheckedStatement(CheckedStatementData { block, is_checked }),
        );
        self.adopt(idx, &[block]);
        idx
    }

    pub fn unsafe_statement(&mut self, span: TextSpan, block: NodeIndex) -> NodeIndex {
        let idx = self.add(
            k::UNSAFE_STATEMENT,
            span,
            NodeData::UnsafeStatement(UnsafeStatementData { block }),
        );
        self.adopt(idx, &[block]);
        idx
    }

    pub fn foreach(
        &mut self,
        span: TextSpan,
        identifier: impl Into<String>,
        collection: NodeIndex,
        body: NodeIndex,
    ) -> NodeIndex {
        let idx = self.add(
            k::FOREACH_STATEMENT,
            span,
            NodeData::ForEach(ForEachData {
                identifier: identifier.into(),
                collection,
                body,
            }),
        );
        self.adopt(idx, &[collection, body]);
        idx
    }

    // =========================================================================
    // Names and type syntax
    // =========================================================================

    pub fn identifier(&mut self, span: TextSpan, text: impl Into<String>) -> NodeIndex {
        self.add(
            k::IDENTIFIER_NAME,
            span,
            NodeData::Identifier(IdentifierData { text: text.into() }),
        )
    }

    pub fn predefined_type(&mut self, span: TextSpan, keyword: impl Into<String>) -> NodeIndex {
        self.add(
            k::PREDEFINED_TYPE,
            span,
            NodeData::Identifier(IdentifierData {
                text: keyword.into(),
            }),
        )
    }

    pub fn qualified_name(
        &mut self,
        span: TextSpan,
        left: NodeIndex,
        right: impl Into<String>,
    ) -> NodeIndex {
        let idx = self.add(
            k::QUALIFIED_NAME,
            span,
            NodeData::QualifiedName(QualifiedNameData {
                left,
                right: right.into(),
            }),
        );
        self.adopt(idx, &[left]);
        idx
    }

    pub fn array_type(&mut self, span: TextSpan, element: NodeIndex) -> NodeIndex {
        let idx = self.add(
            k::ARRAY_TYPE,
            span,
            NodeData::ArrayType(ArrayTypeData { element }),
        );
        self.adopt(idx, &[element]);
        idx
    }

    pub fn nullable_type(&mut self, span: TextSpan, underlying: NodeIndex) -> NodeIndex {
        let idx = self.add(
            k::NULLABLE_TYPE,
            span,
            NodeData::NullableType(NullableTypeData { underlying }),
        );
        self.adopt(idx, &[underlying]);
        idx
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub fn literal(&mut self, span: TextSpan, value: SyntaxLiteral) -> NodeIndex {
        self.add(
            k::LITERAL_EXPRESSION,
            span,
            NodeData::Literal(LiteralExprData { value }),
        )
    }

    pub fn interpolated_string(&mut self, span: TextSpan, parts: NodeList) -> NodeIndex {
        let idx = self.add(
            k::INTERPOLATED_STRING_EXPRESSION,
            span,
            NodeData::InterpolatedString(InterpolatedStringData {
                parts: parts.clone(),
            }),
        );
        self.adopt_list(idx, &parts);
        idx
    }

    pub fn interpolation(
        &mut self,
        span: TextSpan,
        expression: NodeIndex,
        alignment: NodeIndex,
        format: Option<String>,
    ) -> NodeIndex {
        let idx = self.add(
            k::INTERPOLATION,
            span,
            NodeData::Interpolation(InterpolationData {
                expression,
                alignment,
                format,
            }),
        );
        self.adopt(idx, &[expression, alignment]);
        idx
    }

    pub fn interpolated_text(&mut self, span: TextSpan, text: impl Into<String>) -> NodeIndex {
        self.add(
            k::INTERPOLATED_STRING_TEXT,
            span,
            NodeData::InterpolatedText(InterpolatedTextData { text: text.into() }),
        )
    }

    pub fn binary(
        &mut self,
        span: TextSpan,
        operator: BinaryOperator,
        left: NodeIndex,
        right: NodeIndex,
    ) -> NodeIndex {
        let idx = self.add(
            k::BINARY_EXPRESSION,
            span,
            NodeData::Binary(BinaryExprData {
                operator,
                left,
                right,
            }),
        );
        self.adopt(idx, &[left, right]);
        idx
    }

    pub fn assignment(
        &mut self,
        span: TextSpan,
        target: NodeIndex,
        value: NodeIndex,
        is_ref: bool,
    ) -> NodeIndex {
        let idx = self.add(
            k::ASSIGNMENT_EXPRESSION,
            span,
            NodeData::Assignment(AssignmentData {
                target,
                value,
                is_ref,
            }),
        );
        self.adopt(idx, &[target, value]);
        idx
    }

    pub fn invocation(
        &mut self,
        span: TextSpan,
        expression: NodeIndex,
        argument_list: NodeIndex,
    ) -> NodeIndex {
        let idx = self.add(
            k::INVOCATION_EXPRESSION,
            span,
            NodeData::Invocation(InvocationData {
                expression,
                argument_list,
            }),
        );
        self.adopt(idx, &[expression, argument_list]);
        idx
    }

    pub fn member_access(
        &mut self,
        span: TextSpan,
        expression: NodeIndex,
        name: impl Into<String>,
        name_span: TextSpan,
    ) -> NodeIndex {
        let idx = self.add(
            k::MEMBER_ACCESS_EXPRESSION,
            span,
            NodeData::MemberAccess(MemberAccessData {
                expression,
                name: name.into(),
                name_span,
            }),
        );
        self.adopt(idx, &[expression]);
        idx
    }

    pub fn object_creation(
        &mut self,
        span: TextSpan,
        ty: NodeIndex,
        argument_list: NodeIndex,
        initializer: NodeIndex,
    ) -> NodeIndex {
        let idx = self.add(
            k::OBJECT_CREATION_EXPRESSION,
            span,
            NodeData::ObjectCreation(ObjectCreationData {
                ty,
                argument_list,
                initializer,
            }),
        );
        self.adopt(idx, &[ty, argument_list, initializer]);
        idx
    }

    pub fn object_initializer(&mut self, span: TextSpan, assignments: NodeList) -> NodeIndex {
        let idx = self.add(
            k::OBJECT_INITIALIZER,
            span,
            NodeData::ObjectInitializer(ObjectInitializerData {
                assignments: assignments.clone(),
            }),
        );
        self.adopt_list(idx, &assignments);
        idx
    }

    pub fn tuple(&mut self, span: TextSpan, elements: NodeList) -> NodeIndex {
        let idx = self.add(
            k::TUPLE_EXPRESSION,
            span,
            NodeData::Tuple(TupleExprData {
                elements: elements.clone(),
            }),
        );
        self.adopt_list(idx, &elements);
        idx
    }

    pub fn lambda(&mut self, span: TextSpan, parameter_list: NodeIndex, body: NodeIndex) -> NodeIndex {
        let idx = self.add(
            k::LAMBDA_EXPRESSION,
            span,
            NodeData::Lambda(LambdaData {
                parameter_list,
                body,
            }),
        );
        self.adopt(idx, &[parameter_list, body]);
        idx
    }

    pub fn ref_expr(&mut self, span: TextSpan, operand: NodeIndex) -> NodeIndex {
        let idx = self.add(k::REF_EXPRESSION, span, NodeData::RefExpr(RefExprData { operand }));
        self.adopt(idx, &[operand]);
        idx
    }

    pub fn argument_list(&mut self, span: TextSpan, arguments: NodeList) -> NodeIndex {
        let idx = self.add(
            k::ARGUMENT_LIST,
            span,
            NodeData::ArgumentList(ArgumentListData {
                arguments: arguments.clone(),
            }),
        );
        self.adopt_list(idx, &arguments);
        idx
    }

    pub fn argument(
        &mut self,
        span: TextSpan,
        name: Option<String>,
        ref_kind: ArgumentRefKind,
        expression: NodeIndex,
    ) -> NodeIndex {
        let idx = self.add(
            k::ARGUMENT,
            span,
            NodeData::Argument(ArgumentData {
                name,
                ref_kind,
                expression,
            }),
        );
        self.adopt(idx, &[expression]);
        idx
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    pub fn attribute_list(&mut self, span: TextSpan, attributes: NodeList) -> NodeIndex {
        let idx = self.add(
            k::ATTRIBUTE_LIST,
            span,
            NodeData::AttributeList(AttributeListData {
                attributes: attributes.clone(),
            }),
        );
        self.adopt_list(idx, &attributes);
        idx
    }

    pub fn attribute(
        &mut self,
        span: TextSpan,
        name: impl Into<String>,
        name_span: TextSpan,
        argument_list: NodeIndex,
    ) -> NodeIndex {
        let idx = self.add(
            k::ATTRIBUTE,
            span,
            NodeData::Attribute(AttributeSyntaxData {
                name: name.into(),
                name_span,
                argument_list,
            }),
        );
        self.adopt(idx, &[argument_list]);
        idx
    }

    pub fn attribute_argument_list(&mut self, span: TextSpan, arguments: NodeList) -> NodeIndex {
        let idx = self.add(
            k::ATTRIBUTE_ARGUMENT_LIST,
            span,
            NodeData::AttributeArgumentList(AttributeArgumentListData {
                arguments: arguments.clone(),
            }),
        );
        self.adopt_list(idx, &arguments);
        idx
    }

    pub fn attribute_argument(
        &mut self,
        span: TextSpan,
        name_equals: Option<String>,
        name_colon: Option<String>,
        expression: NodeIndex,
    ) -> NodeIndex {
        let idx = self.add(
            k::ATTRIBUTE_ARGUMENT,
            span,
            NodeData::AttributeArgument(AttributeArgumentData {
                name_equals,
                name_colon,
                expression,
            }),
        );
        self.adopt(idx, &[expression]);
        idx
    }

    // =========================================================================
    // Patterns
    // =========================================================================

    pub fn constant_pattern(&mut self, span: TextSpan, expression: NodeIndex) -> NodeIndex {
        let idx = self.add(
            k::CONSTANT_PATTERN,
            span,
            NodeData::ConstantPattern(ConstantPatternData { expression }),
        );
        self.adopt(idx, &[expression]);
        idx
    }

    pub fn declaration_pattern(
        &mut self,
        span: TextSpan,
        ty: NodeIndex,
        designation: Option<String>,
    ) -> NodeIndex {
        let idx = self.add(
            k::DECLARATION_PATTERN,
            span,
            NodeData::DeclarationPattern(DeclarationPatternData { ty, designation }),
        );
        self.adopt(idx, &[ty]);
        idx
    }

    pub fn type_pattern(&mut self, span: TextSpan, ty: NodeIndex) -> NodeIndex {
        let idx = self.add(
            k::TYPE_PATTERN,
            span,
            NodeData::TypePattern(TypePatternData { ty }),
        );
        self.adopt(idx, &[ty]);
        idx
    }

    pub fn discard_pattern(&mut self, span: TextSpan) -> NodeIndex {
        self.add(k::DISCARD_PATTERN, span, NodeData::None)
    }

    pub fn recursive_pattern(
        &mut self,
        span: TextSpan,
        ty: NodeIndex,
        positional: Option<NodeList>,
        properties: Option<NodeList>,
        designation: Option<String>,
    ) -> NodeIndex {
        let mut children: SmallVec<[NodeIndex; 8]> = SmallVec::new();
        children.push(ty);
        if let Some(ref list) = positional {
            children.extend(list.iter());
        }
        if let Some(ref list) = properties {
            children.extend(list.iter());
        }
        let idx = self.add(
            k::RECURSIVE_PATTERN,
            span,
            NodeData::RecursivePattern(RecursivePatternData {
                ty,
                positional,
                properties,
                designation,
            }),
        );
        self.adopt(idx, &children);
        idx
    }

    pub fn subpattern(
        &mut self,
        span: TextSpan,
        name: Option<String>,
        pattern: NodeIndex,
    ) -> NodeIndex {
        let idx = self.add(
            k::SUBPATTERN,
            span,
            NodeData::Subpattern(SubpatternData { name, pattern }),
        );
        self.adopt(idx, &[pattern]);
        idx
    }

    pub fn list_pattern(
        &mut self,
        span: TextSpan,
        elements: NodeList,
        designation: Option<String>,
    ) -> NodeIndex {
        let idx = self.add(
            k::LIST_PATTERN,
            span,
            NodeData::ListPattern(ListPatternData {
                elements: elements.clone(),
                designation,
            }),
        );
        self.adopt_list(idx, &elements);
        idx
    }

    pub fn slice_pattern(&mut self, span: TextSpan, pattern: NodeIndex) -> NodeIndex {
        let idx = self.add(
            k::SLICE_PATTERN,
            span,
            NodeData::SlicePattern(SlicePatternData { pattern }),
        );
        self.adopt(idx, &[pattern]);
        idx
    }

    pub fn relational_pattern(
        &mut self,
        span: TextSpan,
        operator: RelationalOperator,
        expression: NodeIndex,
    ) -> NodeIndex {
        let idx = self.add(
            k::RELATIONAL_PATTERN,
            span,
            NodeData::RelationalPattern(RelationalPatternData {
                operator,
                expression,
            }),
        );
        self.adopt(idx, &[expression]);
        idx
    }

    pub fn binary_pattern(
        &mut self,
        span: TextSpan,
        is_conjunction: bool,
        left: NodeIndex,
        right: NodeIndex,
    ) -> NodeIndex {
        let kind = if is_conjunction {
            k::AND_PATTERN
        } else {
            k::OR_PATTERN
        };
        let idx = self.add(
            kind,
            span,
            NodeData::BinaryPattern(BinaryPatternData { left, right }),
        );
        self.adopt(idx, &[left, right]);
        idx
    }

    pub fn not_pattern(&mut self, span: TextSpan, pattern: NodeIndex) -> NodeIndex {
        let idx = self.add(
            k::NOT_PATTERN,
            span,
            NodeData::UnaryPattern(UnaryPatternData { pattern }),
        );
        self.adopt(idx, &[pattern]);
        idx
    }

    pub fn parenthesized_pattern(&mut self, span: TextSpan, pattern: NodeIndex) -> NodeIndex {
        let idx = self.add(
            k::PARENTHESIZED_PATTERN,
            span,
            NodeData::UnaryPattern(UnaryPatternData { pattern }),
        );
        self.adopt(idx, &[pattern]);
        idx
    }

    pub fn is_pattern(
        &mut self,
        span: TextSpan,
        expression: NodeIndex,
        pattern: NodeIndex,
    ) -> NodeIndex {
        let idx = self.add(
            k::IS_PATTERN_EXPRESSION,
            span,
            NodeData::IsPattern(IsPatternData {
                expression,
                pattern,
            }),
        );
        self.adopt(idx, &[expression, pattern]);
        idx
    }

    // =========================================================================
    // Switches
    // =========================================================================

    pub fn switch_statement(
        &mut self,
        span: TextSpan,
        expression: NodeIndex,
        sections: NodeList,
    ) -> NodeIndex {
        let mut children: SmallVec<[NodeIndex; 8]> = SmallVec::new();
        children.push(expression);
        children.extend(sections.iter());
        let idx = self.add(
            k::SWITCH_STATEMENT,
            span,
            NodeData::SwitchStatement(SwitchStatementData {
                expression,
                sections,
            }),
        );
        self.adopt(idx, &children);
        idx
    }

    pub fn switch_section(
        &mut self,
        span: TextSpan,
        labels: NodeList,
        statements: NodeList,
    ) -> NodeIndex {
        let mut children: SmallVec<[NodeIndex; 8]> = SmallVec::new();
        children.extend(labels.iter());
        children.extend(statements.iter());
        let idx = self.add(
            k::SWITCH_SECTION,
            span,
            NodeData::SwitchSection(SwitchSectionData { labels, statements }),
        );
        self.adopt(idx, &children);
        idx
    }

    pub fn case_pattern_label(
        &mut self,
        span: TextSpan,
        pattern: NodeIndex,
        when_clause: NodeIndex,
    ) -> NodeIndex {
        let idx = self.add(
            k::CASE_PATTERN_SWITCH_LABEL,
            span,
            NodeData::CasePatternLabel(CasePatternLabelData {
                pattern,
                when_clause,
            }),
        );
        self.adopt(idx, &[pattern, when_clause]);
        idx
    }

    pub fn default_label(&mut self, span: TextSpan) -> NodeIndex {
        self.add(k::DEFAULT_SWITCH_LABEL, span, NodeData::None)
    }

    pub fn switch_expression(
        &mut self,
        span: TextSpan,
        expression: NodeIndex,
        arms: NodeList,
    ) -> NodeIndex {
        let mut children: SmallVec<[NodeIndex; 8]> = SmallVec::new();
        children.push(expression);
        children.extend(arms.iter());
        let idx = self.add(
            k::SWITCH_EXPRESSION,
            span,
            NodeData::SwitchExpression(SwitchExpressionData { expression, arms }),
        );
        self.adopt(idx, &children);
        idx
    }

    pub fn switch_arm(
        &mut self,
        span: TextSpan,
        pattern: NodeIndex,
        when_clause: NodeIndex,
        expression: NodeIndex,
    ) -> NodeIndex {
        let idx = self.add(
            k::SWITCH_EXPRESSION_ARM,
            span,
            NodeData::SwitchArm(SwitchArmData {
                pattern,
                when_clause,
                expression,
            }),
        );
        self.adopt(idx, &[pattern, when_clause, expression]);
        idx
    }

    // =========================================================================
    // Documentation cross-references
    // =========================================================================

    pub fn doc_cref(&mut self, span: TextSpan, target: impl Into<String>) -> NodeIndex {
        self.add(
            k::DOC_CREF,
            span,
            NodeData::DocCref(DocCrefData {
                target: target.into(),
            }),
        )
    }
}
