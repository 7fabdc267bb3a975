use super::message::DisplayedMessage;

/// Tham chiếu opaque tới phần hiển thị của một tin nhắn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderHandle(pub u64);

/// Phía hiển thị mà reconciler điều khiển (egui hoặc console).
pub trait Renderer {
    /// Vẽ một tin nhắn mới ở cuối khung chat. Tin pending dùng kiểu hiển thị mờ.
    fn create(&mut self, message: &DisplayedMessage) -> RenderHandle;

    /// Cập nhật tại chỗ phần hiển thị đã có (bỏ kiểu pending, đặt giờ server).
    fn update(&mut self, handle: RenderHandle, message: &DisplayedMessage);

    /// Xoá toàn bộ khung chat.
    fn clear(&mut self);

    /// Thông báo hệ thống; không thuộc danh sách tin nhắn.
    fn notice(&mut self, text: &str);

    /// Dòng trạng thái tạm thời (kết quả gửi tin, lỗi lệnh).
    fn status(&mut self, text: &str);
}
