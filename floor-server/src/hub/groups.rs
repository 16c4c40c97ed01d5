//! Group name builders
//!
//! 组名与键名一样走构造器，杜绝手拼字符串。

/// Staff 仪表盘组
pub const STAFF_GROUP: &str = "staff";

/// 某餐桌的客户端组 `table:{number}`
pub fn table_group(table_number: &str) -> String {
    format!("table:{}", table_number)
}

/// 某厨房区域的厨师组 `{area}:kitchen`（area 已规范化）
pub fn kitchen_group(area: &str) -> String {
    format!("{}:kitchen", area)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_names() {
        assert_eq!(table_group("12"), "table:12");
        assert_eq!(kitchen_group("grill"), "grill:kitchen");
        assert_eq!(kitchen_group("UNKNOWN"), "UNKNOWN:kitchen");
    }
}
