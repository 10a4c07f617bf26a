//! Node arena: storage, parent links, and typed payload accessors.

use sable_common::TextSpan;

/// Index of a node in the arena. `NodeIndex::NONE` is the absent node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl Default for NodeIndex {
    fn default() -> NodeIndex {
        NodeIndex::NONE
    }
}

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    pub const fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }

    pub const fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }
}

/// An ordered list of child node indices.
#[derive(Clone, Debug, Default)]
pub struct NodeList {
    pub nodes: Vec<NodeIndex>,
}

impl NodeList {
    pub fn new(nodes: Vec<NodeIndex>) -> NodeList {
        NodeList { nodes }
    }

    pub fn empty() -> NodeList {
        NodeList { nodes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes.iter().copied()
    }
}

impl FromIterator<NodeIndex> for NodeList {
    fn from_iter<T: IntoIterator<Item = NodeIndex>>(iter: T) -> NodeList {
        NodeList {
            nodes: iter.into_iter().collect(),
        }
    }
}

/// Declaration and parameter modifier bits.
pub mod modifiers {
    pub const PUBLIC: u32 = 1 << 0;
    pub const PRIVATE: u32 = 1 << 1;
    pub const PROTECTED: u32 = 1 << 2;
    pub const INTERNAL: u32 = 1 << 3;
    pub const STATIC: u32 = 1 << 4;
    pub const PARTIAL: u32 = 1 << 5;
    pub const UNSAFE: u32 = 1 << 6;
    pub const READONLY: u32 = 1 << 7;
    // Parameter passing modes
    pub const REF: u32 = 1 << 8;
    pub const OUT: u32 = 1 << 9;
    pub const IN: u32 = 1 << 10;
    pub const PARAMS: u32 = 1 << 11;
    pub const SCOPED: u32 = 1 << 12;
    /// Extension-method receiver (`this` on the first parameter).
    pub const THIS: u32 = 1 << 13;
}

/// A node header: kind plus spans. Payloads live in a parallel table.
#[derive(Clone, Debug)]
pub struct Node {
    pub kind: u16,
    /// Significant token range (diagnostics).
    pub span: TextSpan,
    /// Range including attached trivia (position gating).
    pub full_span: TextSpan,
}

/// Parent link and slot bookkeeping for a node.
#[derive(Clone, Debug)]
pub struct ExtendedInfo {
    pub parent: NodeIndex,
}

// =============================================================================
// Payloads
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum SyntaxLiteral {
    Null,
    Bool(bool),
    I32(i32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(f64),
    Char(char),
    String(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AccessorKind {
    Get,
    Set,
    Init,
}

#[derive(Clone, Debug, Default)]
pub struct CompilationUnitData {
    pub externs: NodeList,
    pub usings: NodeList,
    /// Type/namespace members and `GLOBAL_STATEMENT` nodes, in source order.
    pub members: NodeList,
}

#[derive(Clone, Debug)]
pub struct NamespaceDeclData {
    pub name: String,
    pub name_span: TextSpan,
    pub externs: NodeList,
    pub usings: NodeList,
    pub members: NodeList,
}

#[derive(Clone, Debug)]
pub struct UsingDirectiveData {
    /// `using Alias = Target;` carries the alias name.
    pub alias: Option<String>,
    pub target: String,
}

#[derive(Clone, Debug)]
pub struct ExternAliasData {
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct GlobalStatementData {
    pub statement: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct TypeDeclData {
    pub name: String,
    pub name_span: TextSpan,
    pub type_parameters: NodeList,
    pub base_list: NodeIndex,
    pub members: NodeList,
    pub attribute_lists: NodeList,
    pub modifiers: u32,
}

#[derive(Clone, Debug)]
pub struct BaseListData {
    pub types: NodeList,
}

#[derive(Clone, Debug)]
pub struct MethodDeclData {
    pub name: String,
    pub name_span: TextSpan,
    pub type_parameters: NodeList,
    pub parameter_list: NodeIndex,
    pub return_type: NodeIndex,
    pub body: NodeIndex,
    pub expression_body: NodeIndex,
    pub modifiers: u32,
}

#[derive(Clone, Debug)]
pub struct ConstructorDeclData {
    pub name: String,
    pub parameter_list: NodeIndex,
    pub body: NodeIndex,
    pub modifiers: u32,
}

#[derive(Clone, Debug)]
pub struct OperatorDeclData {
    pub token: String,
    pub parameter_list: NodeIndex,
    pub return_type: NodeIndex,
    pub body: NodeIndex,
    pub modifiers: u32,
}

#[derive(Clone, Debug)]
pub struct PropertyDeclData {
    pub name: String,
    pub name_span: TextSpan,
    pub ty: NodeIndex,
    pub accessors: NodeList,
    pub expression_body: NodeIndex,
    pub modifiers: u32,
}

#[derive(Clone, Debug)]
pub struct AccessorDeclData {
    pub accessor_kind: AccessorKind,
    pub body: NodeIndex,
    pub expression_body: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct FieldDeclData {
    pub name: String,
    pub name_span: TextSpan,
    pub ty: NodeIndex,
    pub initializer: NodeIndex,
    pub modifiers: u32,
}

#[derive(Clone, Debug)]
pub struct EnumMemberData {
    pub name: String,
    pub value: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ParameterListData {
    pub parameters: NodeList,
}

#[derive(Clone, Debug)]
pub struct ParameterData {
    pub name: String,
    pub ty: NodeIndex,
    pub modifiers: u32,
    pub default_value: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct TypeParameterData {
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct BlockData {
    pub statements: NodeList,
}

#[derive(Clone, Debug)]
pub struct LocalDeclData {
    pub name: String,
    pub ty: NodeIndex,
    pub initializer: NodeIndex,
    pub is_ref: bool,
    pub is_scoped: bool,
}

#[derive(Clone, Debug)]
pub struct LocalFunctionData {
    pub name: String,
    pub parameter_list: NodeIndex,
    pub return_type: NodeIndex,
    pub body: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ExpressionStatementData {
    pub expression: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ReturnStatementData {
    pub expression: NodeIndex,
    pub is_ref: bool,
}

#[derive(Clone, Debug)]
pub struct CheckedStatementData {
    pub block: NodeIndex,
    pub is_checked: bool,
}

#[derive(Clone, Debug)]
pub struct UnsafeStatementData {
    pub block: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ForEachData {
    pub identifier: String,
    pub collection: NodeIndex,
    pub body: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct IdentifierData {
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct QualifiedNameData {
    pub left: NodeIndex,
    pub right: String,
}

#[derive(Clone, Debug)]
pub struct ArrayTypeData {
    pub element: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct NullableTypeData {
    pub underlying: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct LiteralExprData {
    pub value: SyntaxLiteral,
}

#[derive(Clone, Debug)]
pub struct InterpolatedStringData {
    pub parts: NodeList,
}

#[derive(Clone, Debug)]
pub struct InterpolationData {
    pub expression: NodeIndex,
    pub alignment: NodeIndex,
    pub format: Option<String>,
}

#[derive(Clone, Debug)]
pub struct InterpolatedTextData {
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct BinaryExprData {
    pub operator: BinaryOperator,
    pub left: NodeIndex,
    pub right: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct AssignmentData {
    pub target: NodeIndex,
    pub value: NodeIndex,
    pub is_ref: bool,
}

#[derive(Clone, Debug)]
pub struct InvocationData {
    pub expression: NodeIndex,
    pub argument_list: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct MemberAccessData {
    pub expression: NodeIndex,
    pub name: String,
    pub name_span: TextSpan,
}

#[derive(Clone, Debug)]
pub struct ObjectCreationData {
    pub ty: NodeIndex,
    pub argument_list: NodeIndex,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ObjectInitializerData {
    pub assignments: NodeList,
}

#[derive(Clone, Debug)]
pub struct TupleExprData {
    pub elements: NodeList,
}

#[derive(Clone, Debug)]
pub struct LambdaData {
    pub parameter_list: NodeIndex,
    pub body: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct RefExprData {
    pub operand: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ArgumentListData {
    pub arguments: NodeList,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArgumentRefKind {
    None,
    Ref,
    Out,
    In,
}

#[derive(Clone, Debug)]
pub struct ArgumentData {
    pub name: Option<String>,
    pub ref_kind: ArgumentRefKind,
    pub expression: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct AttributeListData {
    pub attributes: NodeList,
}

#[derive(Clone, Debug)]
pub struct AttributeSyntaxData {
    pub name: String,
    pub name_span: TextSpan,
    pub argument_list: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct AttributeArgumentListData {
    pub arguments: NodeList,
}

#[derive(Clone, Debug)]
pub struct AttributeArgumentData {
    /// `Name = expr` (named field/property assignment).
    pub name_equals: Option<String>,
    /// `name: expr` (named parameter).
    pub name_colon: Option<String>,
    pub expression: NodeIndex,
}

// Patterns

#[derive(Clone, Debug)]
pub struct ConstantPatternData {
    pub expression: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct DeclarationPatternData {
    pub ty: NodeIndex,
    pub designation: Option<String>,
}

#[derive(Clone, Debug)]
pub struct TypePatternData {
    pub ty: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct RecursivePatternData {
    pub ty: NodeIndex,
    /// `Type(p1, p2)` positional deconstruction sub-patterns, if present.
    pub positional: Option<NodeList>,
    /// `Type { Name: p }` property sub-patterns, if present.
    pub properties: Option<NodeList>,
    pub designation: Option<String>,
}

#[derive(Clone, Debug)]
pub struct SubpatternData {
    /// Property name for property sub-patterns; `None` for positional.
    pub name: Option<String>,
    pub pattern: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ListPatternData {
    pub elements: NodeList,
    pub designation: Option<String>,
}

#[derive(Clone, Debug)]
pub struct SlicePatternData {
    pub pattern: NodeIndex,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RelationalOperator {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

#[derive(Clone, Debug)]
pub struct RelationalPatternData {
    pub operator: RelationalOperator,
    pub expression: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct BinaryPatternData {
    pub left: NodeIndex,
    pub right: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct UnaryPatternData {
    pub pattern: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct IsPatternData {
    pub expression: NodeIndex,
    pub pattern: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct SwitchStatementData {
    pub expression: NodeIndex,
    pub sections: NodeList,
}

#[derive(Clone, Debug)]
pub struct SwitchSectionData {
    pub labels: NodeList,
    pub statements: NodeList,
}

#[derive(Clone, Debug)]
pub struct CasePatternLabelData {
    pub pattern: NodeIndex,
    pub when_clause: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct SwitchExpressionData {
    pub expression: NodeIndex,
    pub arms: NodeList,
}

#[derive(Clone, Debug)]
pub struct SwitchArmData {
    pub pattern: NodeIndex,
    pub when_clause: NodeIndex,
    pub expression: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct DocCrefData {
    pub target: String,
}

/// Payload storage. One variant per payload-carrying kind; marker kinds
/// (discard patterns, default labels) carry `None`.
#[derive(Clone, Debug)]
pub enum NodeData {
    None,
    CompilationUnit(CompilationUnitData),
    Namespace(NamespaceDeclData),
    UsingDirective(UsingDirectiveData),
    ExternAlias(ExternAliasData),
    GlobalStatement(GlobalStatementData),
    TypeDecl(TypeDeclData),
    BaseList(BaseListData),
    Method(MethodDeclData),
    Constructor(ConstructorDeclData),
    Operator(OperatorDeclData),
    Property(PropertyDeclData),
    Accessor(AccessorDeclData),
    Field(FieldDeclData),
    EnumMember(EnumMemberData),
    ParameterList(ParameterListData),
    Parameter(ParameterData),
    TypeParameter(TypeParameterData),
    Block(BlockData),
    LocalDecl(LocalDeclData),
    LocalFunction(LocalFunctionData),
    ExpressionStatement(ExpressionStatementData),
    Return(ReturnStatementData),
    CheckedStatement(CheckedStatementData),
    UnsafeStatement(UnsafeStatementData),
    ForEach(ForEachData),
    Identifier(IdentifierData),
    QualifiedName(QualifiedNameData),
    ArrayType(ArrayTypeData),
    NullableType(NullableTypeData),
    Literal(LiteralExprData),
    InterpolatedString(InterpolatedStringData),
    Interpolation(InterpolationData),
    InterpolatedText(InterpolatedTextData),
    Binary(BinaryExprData),
    Assignment(AssignmentData),
    Invocation(InvocationData),
    MemberAccess(MemberAccessData),
    ObjectCreation(ObjectCreationData),
    ObjectInitializer(ObjectInitializerData),
    Tuple(TupleExprData),
    Lambda(LambdaData),
    RefExpr(RefExprData),
    ArgumentList(ArgumentListData),
    Argument(ArgumentData),
    AttributeList(AttributeListData),
    Attribute(AttributeSyntaxData),
    AttributeArgumentList(AttributeArgumentListData),
    AttributeArgument(AttributeArgumentData),
    ConstantPattern(ConstantPatternData),
    DeclarationPattern(DeclarationPatternData),
    TypePattern(TypePatternData),
    RecursivePattern(RecursivePatternData),
    Subpattern(SubpatternData),
    ListPattern(ListPatternData),
    SlicePattern(SlicePatternData),
    RelationalPattern(RelationalPatternData),
    BinaryPattern(BinaryPatternData),
    UnaryPattern(UnaryPatternData),
    IsPattern(IsPatternData),
    SwitchStatement(SwitchStatementData),
    SwitchSection(SwitchSectionData),
    CasePatternLabel(CasePatternLabelData),
    SwitchExpression(SwitchExpressionData),
    SwitchArm(SwitchArmData),
    DocCref(DocCrefData),
}

// =============================================================================
// Arena
// =============================================================================

/// The node arena. Append-only during construction, immutable afterwards.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
    data: Vec<NodeData>,
    extended_info: Vec<ExtendedInfo>,
    root: NodeIndex,
}

macro_rules! typed_accessor {
    ($name:ident, $variant:ident, $ty:ty) => {
        pub fn $name(&self, idx: NodeIndex) -> Option<&$ty> {
            match self.data.get(idx.0 as usize)? {
                NodeData::$variant(data) => Some(data),
                _ => None,
            }
        }
    };
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena {
            root: NodeIndex::NONE,
            ..NodeArena::default()
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub(crate) fn set_root(&mut self, root: NodeIndex) {
        self.root = root;
    }

    pub(crate) fn push(&mut self, node: Node, data: NodeData) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(node);
        self.data.push(data);
        self.extended_info.push(ExtendedInfo {
            parent: NodeIndex::NONE,
        });
        idx
    }

    pub(crate) fn set_parent(&mut self, child: NodeIndex, parent: NodeIndex) {
        if let Some(ext) = self.extended_info.get_mut(child.0 as usize) {
            ext.parent = parent;
        }
    }

    pub fn get(&self, idx: NodeIndex) -> Option<&Node> {
        self.nodes.get(idx.0 as usize)
    }

    pub fn get_extended(&self, idx: NodeIndex) -> Option<&ExtendedInfo> {
        self.extended_info.get(idx.0 as usize)
    }

    /// The parent of a node, or `NodeIndex::NONE` at the root.
    pub fn parent_of(&self, idx: NodeIndex) -> NodeIndex {
        self.get_extended(idx)
            .map(|ext| ext.parent)
            .unwrap_or(NodeIndex::NONE)
    }

    pub fn kind_of(&self, idx: NodeIndex) -> u16 {
        self.get(idx).map(|node| node.kind).unwrap_or(0)
    }

    /// Whether `idx` names a node that belongs to this arena.
    pub fn contains(&self, idx: NodeIndex) -> bool {
        (idx.0 as usize) < self.nodes.len()
    }

    /// Resolve the simple-name text of a name node (identifier, qualified
    /// name right part, or predefined type keyword).
    pub fn name_text(&self, idx: NodeIndex) -> Option<&str> {
        match self.data.get(idx.0 as usize)? {
            NodeData::Identifier(data) => Some(&data.text),
            NodeData::QualifiedName(data) => Some(&data.right),
            _ => None,
        }
    }

    typed_accessor!(get_compilation_unit, CompilationUnit, CompilationUnitData);
    typed_accessor!(get_namespace, Namespace, NamespaceDeclData);
    typed_accessor!(get_using_directive, UsingDirective, UsingDirectiveData);
    typed_accessor!(get_extern_alias, ExternAlias, ExternAliasData);
    typed_accessor!(get_global_statement, GlobalStatement, GlobalStatementData);
    typed_accessor!(get_type_decl, TypeDecl, TypeDeclData);
    typed_accessor!(get_base_list, BaseList, BaseListData);
    typed_accessor!(get_method, Method, MethodDeclData);
    typed_accessor!(get_constructor, Constructor, ConstructorDeclData);
    typed_accessor!(get_operator, Operator, OperatorDeclData);
    typed_accessor!(get_property, Property, PropertyDeclData);
    typed_accessor!(get_accessor, Accessor, AccessorDeclData);
    typed_accessor!(get_field, Field, FieldDeclData);
    typed_accessor!(get_enum_member, EnumMember, EnumMemberData);
    typed_accessor!(get_parameter_list, ParameterList, ParameterListData);
    typed_accessor!(get_parameter, Parameter, ParameterData);
    typed_accessor!(get_type_parameter, TypeParameter, TypeParameterData);
    typed_accessor!(get_block, Block, BlockData);
    typed_accessor!(get_local_decl, LocalDecl, LocalDeclData);
    typed_accessor!(get_local_function, LocalFunction, LocalFunctionData);
    typed_accessor!(
        get_expression_statement,
        ExpressionStatement,
        ExpressionStatementData
    );
    typed_accessor!(get_return, Return, ReturnStatementData);
    typed_accessor!(get_checked_statement, CheckedStatement, CheckedStatementData);
    typed_accessor!(get_unsafe_statement, UnsafeStatement, UnsafeStatementData);
    typed_accessor!(get_foreach, ForEach, ForEachData);
    typed_accessor!(get_identifier, Identifier, IdentifierData);
    typed_accessor!(get_qualified_name, QualifiedName, QualifiedNameData);
    typed_accessor!(get_array_type, ArrayType, ArrayTypeData);
    typed_accessor!(get_nullable_type, NullableType, NullableTypeData);
    typed_accessor!(get_literal, Literal, LiteralExprData);
    typed_accessor!(
        get_interpolated_string,
        InterpolatedString,
        InterpolatedStringData
    );
    typed_accessor!(get_interpolation, Interpolation, InterpolationData);
    typed_accessor!(get_interpolated_text, InterpolatedText, InterpolatedTextData);
    typed_accessor!(get_binary, Binary, BinaryExprData);
    typed_accessor!(get_assignment, Assignment, AssignmentData);
    typed_accessor!(get_invocation, Invocation, InvocationData);
    typed_accessor!(get_member_access, MemberAccess, MemberAccessData);
    typed_accessor!(get_object_creation, ObjectCreation, ObjectCreationData);
    typed_accessor!(
        get_object_initializer,
        ObjectInitializer,
        ObjectInitializerData
    );
    typed_accessor!(get_tuple, Tuple, TupleExprData);
    typed_accessor!(get_lambda, Lambda, LambdaData);
    typed_accessor!(get_ref_expr, RefExpr, RefExprData);
    typed_accessor!(get_argument_list, ArgumentList, ArgumentListData);
    typed_accessor!(get_argument, Argument, ArgumentData);
    typed_accessor!(get_attribute_list, AttributeList, AttributeListData);
    typed_accessor!(get_attribute, Attribute, AttributeSyntaxData);
    typed_accessor!(
        get_attribute_argument_list,
        AttributeArgumentList,
        AttributeArgumentListData
    );
    typed_accessor!(
        get_attribute_argument,
        AttributeArgument,
        AttributeArgumentData
    );
    typed_accessor!(get_constant_pattern, ConstantPattern, ConstantPatternData);
    typed_accessor!(
        get_declaration_pattern,
        DeclarationPattern,
        DeclarationPatternData
    );
    typed_accessor!(get_type_pattern, TypePattern, TypePatternData);
    typed_accessor!(get_recursive_pattern, RecursivePattern, RecursivePatternData);
    typed_accessor!(get_subpattern, Subpattern, SubpatternData);
    typed_accessor!(get_list_pattern, ListPattern, ListPatternData);
    typed_accessor!(get_slice_pattern, SlicePattern, SlicePatternData);
    typed_accessor!(
        get_relational_pattern,
        RelationalPattern,
        RelationalPatternData
    );
    typed_accessor!(get_binary_pattern, BinaryPattern, BinaryPatternData);
    typed_accessor!(get_unary_pattern, UnaryPattern, UnaryPatternData);
    typed_accessor!(get_is_pattern, IsPattern, IsPatternData);
    typed_accessor!(get_switch_statement, SwitchStatement, SwitchStatementData);
    typed_accessor!(get_switch_section, SwitchSection, SwitchSectionData);
    typed_accessor!(
        get_case_pattern_label,
        CasePatternLabel,
        CasePatternLabelData
    );
    typed_accessor!(get_switch_expression, SwitchExpression, SwitchExpressionData);
    typed_accessor!(get_switch_arm, SwitchArm, SwitchArmData);
    typed_accessor!(get_doc_cref, DocCref, DocCrefData);
}
