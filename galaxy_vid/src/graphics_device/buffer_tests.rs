use super::*;

// ============================================================================
// BufferFormat
// ============================================================================

#[test]
fn test_float_format_sizes() {
    assert_eq!(BufferFormat::R32_SFLOAT.size_bytes(), 4);
    assert_eq!(BufferFormat::R32G32_SFLOAT.size_bytes(), 8);
    assert_eq!(BufferFormat::R32G32B32_SFLOAT.size_bytes(), 12);
    assert_eq!(BufferFormat::R32G32B32A32_SFLOAT.size_bytes(), 16);
}

#[test]
fn test_packed_format_sizes() {
    assert_eq!(BufferFormat::R16G16_SINT.size_bytes(), 4);
    assert_eq!(BufferFormat::R16G16B16A16_SINT.size_bytes(), 8);
    assert_eq!(BufferFormat::R8G8B8A8_UNORM.size_bytes(), 4);
    assert!(BufferFormat::R8G8B8A8_UNORM.is_normalized());
    assert!(!BufferFormat::R32G32_SFLOAT.is_normalized());
}

#[test]
fn test_float_constructor() {
    assert_eq!(BufferFormat::float(3), Some(BufferFormat::R32G32B32_SFLOAT));
    assert_eq!(BufferFormat::float(3).map(|f| f.component_count()), Some(3));
    assert_eq!(BufferFormat::float(0), None);
    assert_eq!(BufferFormat::float(5), None);
}

// ============================================================================
// IndexType
// ============================================================================

#[test]
fn test_index_type_sizes() {
    assert_eq!(IndexType::U8.size_bytes(), 1);
    assert_eq!(IndexType::U16.size_bytes(), 2);
}
